// viewset/pagination.rs - Pagination hook for list actions

use serde_json::{json, Value};

use super::Payload;
use crate::config::PaginationConfig;
use crate::error::ApiError;

/// One page of a list result
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub count: usize,
    pub number: usize,
    pub page_size: usize,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.number * self.page_size < self.count
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

pub trait Paginator: Send + Sync {
    /// Select the page requested by the payload
    fn paginate_queryset(&self, items: Vec<Value>, payload: &Payload) -> Result<Page, ApiError>;

    /// Wrap already rendered page data
    fn get_paginated_response(&self, page: &Page, data: Value, payload: &Payload) -> Value;
}

/// `?page=N&page_size=M` pagination
#[derive(Debug, Clone)]
pub struct PageNumberPagination {
    pub page_size: usize,
    pub max_page_size: usize,
}

impl PageNumberPagination {
    pub const PAGE_PARAM: &'static str = "page";
    pub const PAGE_SIZE_PARAM: &'static str = "page_size";

    /// `None` when pagination is disabled
    pub fn from_config(config: &PaginationConfig) -> Option<Self> {
        config.page_size.map(|page_size| Self {
            page_size,
            max_page_size: config.max_page_size.max(page_size),
        })
    }

    fn page_size(&self, payload: &Payload) -> usize {
        payload
            .query_param(Self::PAGE_SIZE_PARAM)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(self.max_page_size))
            .unwrap_or(self.page_size)
    }

    fn link(&self, payload: &Payload, page: usize) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &payload.query {
            if name != Self::PAGE_PARAM {
                query.append_pair(name, value);
            }
        }
        if page > 1 {
            query.append_pair(Self::PAGE_PARAM, &page.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            payload.path.clone()
        } else {
            format!("{}?{}", payload.path, query)
        }
    }
}

impl Paginator for PageNumberPagination {
    fn paginate_queryset(&self, items: Vec<Value>, payload: &Payload) -> Result<Page, ApiError> {
        let page_size = self.page_size(payload);
        let count = items.len();
        let last_page = count.div_ceil(page_size).max(1);

        let number = match payload.query_param(Self::PAGE_PARAM) {
            None => 1,
            Some("last") => last_page,
            Some(raw) => raw.parse::<usize>().unwrap_or(0),
        };
        if number == 0 || number > last_page {
            return Err(ApiError::not_found("Invalid page.", None));
        }

        let items = items
            .into_iter()
            .skip((number - 1) * page_size)
            .take(page_size)
            .collect();
        Ok(Page {
            items,
            count,
            number,
            page_size,
        })
    }

    fn get_paginated_response(&self, page: &Page, data: Value, payload: &Payload) -> Value {
        let next = page.has_next().then(|| self.link(payload, page.number + 1));
        let previous = page.has_previous().then(|| self.link(payload, page.number - 1));
        json!({
            "count": page.count,
            "next": next,
            "previous": previous,
            "results": data,
        })
    }
}
