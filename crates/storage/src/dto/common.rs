use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            // i64::div_ceil is not stabilized; round up by hand.
            ((total_items + i64::from(page_size) - 1) / i64::from(page_size)) as u32
        };

        Self {
            data,
            pagination: PaginationMeta {
                page,
                page_size,
                total_items,
                total_pages,
            },
        }
    }
}

/// Decimal survives the database round trip exactly; JSON consumers get a
/// plain number.
pub(crate) fn decimal_to_f64(decimal: Decimal) -> f64 {
    decimal.to_string().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let response = PaginatedResponse::new(vec![1, 2, 3], 1, 10, 21);
        assert_eq!(response.pagination.total_pages, 3);
    }

    #[test]
    fn test_total_pages_exact_division() {
        let response = PaginatedResponse::new(vec![1, 2], 1, 10, 20);
        assert_eq!(response.pagination.total_pages, 2);
    }

    #[test]
    fn test_total_pages_empty() {
        let response = PaginatedResponse::<i32>::new(Vec::new(), 1, 25, 0);
        assert_eq!(response.pagination.total_pages, 0);
        assert_eq!(response.pagination.total_items, 0);
    }

    #[test]
    fn test_decimal_to_f64_keeps_scale() {
        assert_eq!(decimal_to_f64("77.25".parse().unwrap()), 77.25);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }
}
