//! Shared fixtures for katalog unit tests.

use crate::models::{Photocard, PhotocardType};

/// A photocard owned by `member` in group `aespa`.
pub fn photocard(id: &str, member: &str, album: &str, version: &str, year: i32) -> Photocard {
    Photocard {
        id: id.to_string(),
        member_id: member.to_lowercase(),
        member_name: member.to_string(),
        group_id: "aespa".to_string(),
        group_name: "aespa".to_string(),
        album: album.to_string(),
        version: version.to_string(),
        year,
        kind: PhotocardType::Album,
        image_url: format!("https://cdn.example/{id}.jpg"),
        back_image_url: None,
    }
}

/// Ids of `cards`, in order.
pub fn ids(cards: &[Photocard]) -> Vec<&str> {
    cards.iter().map(|pc| pc.id.as_str()).collect()
}
