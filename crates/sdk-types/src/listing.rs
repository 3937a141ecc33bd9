//! Property listing records and the projection the chat assistant sees.

use serde::{Deserialize, Serialize};

use crate::types::Locale;

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A property listing as stored by the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_video_url: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// The subset of a listing embedded in the chat preamble.
///
/// Field order is the serialization order, so the snapshot the model sees is
/// stable across calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingContext {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    pub status: String,
}

impl ListingContext {
    pub fn from_listing(listing: &PropertyListing, locale: Locale) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            location: listing.location.clone(),
            bedrooms: listing.bedrooms,
            status: availability_label(listing.is_sold, locale).to_string(),
        }
    }
}

/// Human-readable availability label.
pub fn availability_label(is_sold: bool, locale: Locale) -> &'static str {
    match (locale, is_sold) {
        (Locale::En, true) => "Sold",
        (Locale::En, false) => "Available",
        (Locale::Fr, true) => "Vendue",
        (Locale::Fr, false) => "Disponible",
    }
}

/// Project a slice of listings for the chat preamble.
pub fn listing_contexts(listings: &[PropertyListing], locale: Locale) -> Vec<ListingContext> {
    listings
        .iter()
        .map(|l| ListingContext::from_listing(l, locale))
        .collect()
}
