use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{HotelCatalog, HotelId, HotelWithRooms};

#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Load every hotel together with the catalog size.
    async fn find_all_hotels(&self) -> RepositoryResult<HotelCatalog>;

    /// Load a single hotel with its rooms eagerly joined.
    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>>;
}
