//! Query DTOs - Parametri di ricerca, filtri e paginazione

use crate::entities::{Sentiment, UserRole};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Paginazione 1-based, normalizzata dai repository
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }
}

/// Risposta paginata
#[derive(Serialize, Deserialize, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
        }
    }
}

/// DTO per query parameters di ricerca utenti
/// /users?search=anna&role=manager&organization_id=...&page=2
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UserSearchQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub organization_id: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// niente serde(flatten): con serde_urlencoded i numeri annidati non si deserializzano
impl UserSearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OrganizationSearchQuery {
    pub search: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct FeedbackQuery {
    pub sentiment: Option<Sentiment>,
    pub course_id: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FeedbackQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CourseQuery {
    pub organization_id: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OverviewQuery {
    pub days: Option<u32>,
}
