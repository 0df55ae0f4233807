/// Frame location in byte sources.
///
/// Provides the [`Locator`](locate::Locator) for finding frame headers and
/// reading back the bytes of each located [`Frame`](locate::Frame).
pub mod locate;

/// Input sources.
///
/// The [`Source`](source::Source) capability the locator reads from, with
/// [`Seekable`](source::Seekable) and [`Sequential`](source::Sequential)
/// adapters over `std::io` readers.
pub mod source;
