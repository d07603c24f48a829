use scout_types::Page;

use super::QueryError;

/// Page size of the influencer listing
pub const LISTING_PAGE_SIZE: usize = 12;

/// Slice `items` into the requested 1-indexed page.
///
/// A page past the end yields empty `data`. A zero page is treated as the
/// first page and a zero page size as one, so this never divides by zero.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);

    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let data = items.into_iter().skip(start).take(page_size).collect();

    Page {
        data,
        total,
        page,
        page_size,
        total_pages,
        has_next_page: page < total_pages,
        has_prev_page: page > 1,
    }
}

/// Parse the `page` query value. Missing or blank means the first page;
/// anything that is not a positive integer is rejected.
pub fn parse_page(raw: Option<&str>) -> Result<usize, QueryError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(1);
    };

    match raw.parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(QueryError::InvalidPage(raw.to_string())),
    }
}
