//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so callers can run
//! them on a pooled connection or inside an open transaction.

pub mod alternative_name_repo;
pub mod award_repo;
pub mod credit_repo;
pub mod image_appearance_repo;
pub mod jury_seat_repo;
pub mod nationality_repo;
pub mod page_view_repo;
pub mod person_link_repo;
pub mod person_repo;

pub use alternative_name_repo::AlternativeNameRepo;
pub use award_repo::{FestivalAwardWinnerRepo, MovieAwardRepo};
pub use credit_repo::{CastCreditRepo, CrewCreditRepo};
pub use image_appearance_repo::ImageAppearanceRepo;
pub use jury_seat_repo::JurySeatRepo;
pub use nationality_repo::NationalityRepo;
pub use page_view_repo::PageViewRepo;
pub use person_link_repo::PersonLinkRepo;
pub use person_repo::PersonRepo;
