//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PaginationParams {
    pub fn get_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn get_offset(&self) -> u64 {
        ((self.get_page() - 1) * self.get_per_page()) as u64
    }

    pub fn get_limit(&self) -> u64 {
        self.get_per_page() as u64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub pages: i64,
    pub current: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, current: u32, per_page: u32, total: i64) -> Self {
        let per_page = per_page.max(1) as i64;
        Self {
            items,
            total,
            pages: (total + per_page - 1) / per_page,
            current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(params.get_page(), 3);
        assert_eq!(params.get_per_page(), 10);
        assert_eq!(params.get_offset(), 20);
        assert_eq!(params.get_limit(), 10);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_per_page(), 20);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_pagination_params_clamped() {
        let params = PaginationParams {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_per_page(), 100);
    }

    #[test]
    fn test_paginated_response_pages() {
        let resp = PaginatedResponse::new(vec![1, 2, 3], 1, 12, 25);
        assert_eq!(resp.pages, 3);
        assert_eq!(resp.total, 25);
        assert_eq!(resp.current, 1);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 1, 12, 0);
        assert_eq!(empty.pages, 0);
    }
}
