//! Site integrations.
//!
//! Each module provides one or more structs implementing
//! [`crate::source::Source`] for a specific site's feed or search page.

pub mod gamekult;
pub mod gamekyo;
pub mod howlongtobeat;
pub mod smashing;
pub mod tatoeba;

pub use gamekult::{GamekultArticles, GamekultGames, GamekultNews};
pub use gamekyo::GamekyoFrontPage;
pub use howlongtobeat::HowLongToBeat;
pub use smashing::{Category, SmashingMagazine};
pub use tatoeba::Tatoeba;
