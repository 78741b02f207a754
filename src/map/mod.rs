mod io;
mod map;

pub use map::BeatMap;
