use crate::models::{Failure, PhotoResults};
use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum VoteAction {
    /// Screen became visible. Loads the first page once.
    OnAppear,
    PhotosQueryResults(Result<PhotoResults, Failure>),
    /// Tile tapped. Tapping the current selection clears it.
    SetSelection(String),
    /// `(category, photo id)`; empty id means no vote. Handled by the parent.
    SaveSelection(String, String),
    /// Tile scrolled into view.
    TileDidAppear(String),
    FetchNextPage,
    NextPageResults(Result<PhotoResults, Failure>),
    /// Back button. Handled by the parent.
    Dismiss,
}

impl Action for VoteAction {}
