pub mod bed;
pub mod circular;
pub mod error;
pub mod hts;
pub mod io;
pub mod merge;
pub mod natural;
pub mod sam;
