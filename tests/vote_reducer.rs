mod common;

use common::{page, vote_env, MockImageApi, SearchCall};
use photovote::features::vote::{VoteAction, VoteReducer, VoteState};
use photovote::models::{Failure, PhotoOrientation};
use photovote::mvi::testing::TestStore;

/// Vote state with a first page of 30 photos `p0..p29` out of three pages.
fn loaded_state() -> VoteState {
    let mut state = VoteState::new("cake", "", 10);
    state.did_appear = true;
    state.photos = page("p", 30, 3).results;
    state.total_pages = 3;
    state.did_load_photos = true;
    state
}

#[tokio::test]
async fn on_appear_loads_first_page_once() {
    let api = MockImageApi::new();
    let first = page("p", 30, 3);
    api.respond("cake", 1, Ok(first.clone()));

    let initial = VoteState::new("cake", "", 10);
    let mut store = TestStore::new(initial, VoteReducer, vote_env(api.clone()));
    store.send(VoteAction::OnAppear, |s| s.did_appear = true);
    assert_eq!(store.pending_effects(), 1);

    store.run_effects().await;
    store.receive(VoteAction::PhotosQueryResults(Ok(first.clone())), |s| {
        s.photos = first.results.clone();
        s.total_pages = 3;
        s.did_load_photos = true;
    });

    store.send(VoteAction::OnAppear, |_| {});
    assert_eq!(store.pending_effects(), 0);
    store.finish();

    assert_eq!(
        api.calls(),
        vec![SearchCall {
            query: "cake".to_string(),
            page: 1,
            per_page: 30,
            orientation: PhotoOrientation::Landscape,
        }]
    );
}

#[tokio::test]
async fn failed_search_is_recorded() {
    let api = MockImageApi::new();
    let failure = Failure::new("Invalid status code: 401");
    api.respond("cake", 1, Err(failure.clone()));

    let mut store = TestStore::new(VoteState::new("cake", "", 10), VoteReducer, vote_env(api));
    store.send(VoteAction::OnAppear, |s| s.did_appear = true);
    store.run_effects().await;
    store.receive(VoteAction::PhotosQueryResults(Err(failure.clone())), |s| {
        s.failure = Some(failure.clone());
    });
    store.finish();
    assert!(!store.state().did_load_photos);
}

#[test]
fn selecting_current_photo_clears_the_vote() {
    let mut store = TestStore::new(
        VoteState::new("cake", "42", 10),
        VoteReducer,
        vote_env(MockImageApi::new()),
    );

    store.send(VoteAction::SetSelection("42".into()), |s| {
        s.current_selection = String::new();
    });
    store.receive(VoteAction::SaveSelection("cake".into(), String::new()), |_| {});
    store.finish();
}

#[test]
fn selecting_another_photo_saves_it() {
    let mut store = TestStore::new(
        VoteState::new("cup of tea", "42", 10),
        VoteReducer,
        vote_env(MockImageApi::new()),
    );

    store.send(VoteAction::SetSelection("7".into()), |s| {
        s.current_selection = "7".into();
    });
    store.receive(VoteAction::SaveSelection("cup of tea".into(), "7".into()), |_| {});
    store.finish();
}

#[tokio::test]
async fn tile_near_the_end_fetches_the_next_page() {
    let api = MockImageApi::new();
    let second = page("q", 30, 3);
    api.respond("cake", 2, Ok(second.clone()));

    let mut store = TestStore::new(loaded_state(), VoteReducer, vote_env(api.clone()));
    store.send(VoteAction::TileDidAppear("p20".into()), |s| {
        s.current_id = "p20".into();
        s.fetched_ids.insert("p20".into());
    });
    store.receive(VoteAction::FetchNextPage, |s| s.loading_next_page = true);
    assert_eq!(store.pending_effects(), 1);

    store.run_effects().await;
    store.receive(VoteAction::NextPageResults(Ok(second.clone())), |s| {
        s.loading_next_page = false;
        s.current_page = 2;
        s.photos.extend(second.results.clone());
    });
    store.finish();

    assert_eq!(store.state().photos.len(), 60);
    assert_eq!(api.calls().last().map(|c| c.page), Some(2));
}

#[test]
fn already_fetched_tile_produces_no_effect() {
    let mut state = loaded_state();
    state.fetched_ids.insert("p25".into());

    let mut store = TestStore::new(state, VoteReducer, vote_env(MockImageApi::new()));
    store.send(VoteAction::TileDidAppear("p25".into()), |s| {
        s.current_id = "p25".into();
    });
    assert_eq!(store.pending_effects(), 0);
    store.finish();
}

#[test]
fn tile_far_from_the_end_produces_no_effect() {
    let mut store = TestStore::new(loaded_state(), VoteReducer, vote_env(MockImageApi::new()));
    store.send(VoteAction::TileDidAppear("p3".into()), |s| {
        s.current_id = "p3".into();
    });
    assert_eq!(store.pending_effects(), 0);
    store.finish();
}

#[test]
fn tiles_wait_while_a_page_is_loading() {
    let mut state = loaded_state();
    state.loading_next_page = true;

    let mut store = TestStore::new(state, VoteReducer, vote_env(MockImageApi::new()));
    store.send(VoteAction::TileDidAppear("p29".into()), |s| {
        s.current_id = "p29".into();
    });
    store.finish();
}

#[tokio::test]
async fn failed_next_page_clears_loading() {
    let api = MockImageApi::new();
    let failure = Failure::new("Invalid status code: 500");
    api.respond("cake", 2, Err(failure.clone()));

    let mut store = TestStore::new(loaded_state(), VoteReducer, vote_env(api));
    store.send(VoteAction::FetchNextPage, |s| s.loading_next_page = true);
    store.run_effects().await;
    store.receive(VoteAction::NextPageResults(Err(failure.clone())), |s| {
        s.loading_next_page = false;
        s.failure = Some(failure.clone());
    });
    store.finish();
    assert_eq!(store.state().current_page, 1);
}

#[tokio::test]
async fn crashed_next_page_reports_failure_and_clears_loading() {
    let api = MockImageApi::new();
    api.crash("cake", 2);
    let failure = Failure::new("Effect panicked: image service crashed");

    let mut store = TestStore::new(loaded_state(), VoteReducer, vote_env(api));
    store.send(VoteAction::FetchNextPage, |s| s.loading_next_page = true);
    store.run_effects().await;
    store.receive(VoteAction::NextPageResults(Err(failure.clone())), |s| {
        s.loading_next_page = false;
        s.failure = Some(failure.clone());
    });
    store.finish();
}

#[test]
fn parent_actions_are_ignored() {
    let mut store = TestStore::new(loaded_state(), VoteReducer, vote_env(MockImageApi::new()));
    store.send(VoteAction::Dismiss, |_| {});
    store.send(VoteAction::SaveSelection("cake".into(), "p1".into()), |_| {});
    store.finish();
}
