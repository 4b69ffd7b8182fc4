use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::timeout;

use photovote::config::Config;
use photovote::features::root::{root_reducer, RootAction, RootEnvironment, RootRoute, RootState};
use photovote::features::vote::VoteAction;
use photovote::logging::init_tracing;
use photovote::mvi::{Scheduler, Store, TokioScheduler};
use photovote::navigation::{
    CoordinatorHandle, Destination, NavigationCoordinator, PresentationStyle, ReadinessToken,
    ViewLayer,
};

const STEP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "photovote")]
#[command(version, about = "Vote for your favourite photo in each category")]
struct Args {
    /// Config file (default: <config dir>/photovote/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Vote only in these categories (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Photo to vote for in each category, 1-based
    #[arg(short, long, default_value = "1", value_name = "N")]
    pick: usize,
}

/// What the headless view layer saw.
#[derive(Debug)]
enum ViewEvent {
    Prepare(ReadinessToken),
    Presented(Destination<RootRoute>),
    Dismissed,
}

/// A view layer with no screen: forwards every command to the driver loop.
struct HeadlessView {
    events: mpsc::UnboundedSender<ViewEvent>,
}

impl ViewLayer<RootRoute> for HeadlessView {
    fn prepare(&mut self, token: ReadinessToken) {
        let _ = self.events.send(ViewEvent::Prepare(token));
    }

    fn present(&mut self, destination: Destination<RootRoute>, style: PresentationStyle) {
        tracing::debug!(route = destination.name, ?style, "Headless present");
        let _ = self.events.send(ViewEvent::Presented(destination));
    }

    fn dismiss(&mut self) {
        let _ = self.events.send(ViewEvent::Dismissed);
    }
}

struct Driver {
    store: Store<RootState, RootAction>,
    navigation: CoordinatorHandle<RootRoute>,
    view_events: mpsc::UnboundedReceiver<ViewEvent>,
    pick: usize,
}

impl Driver {
    /// Pump view events until one matches, acknowledging readiness on the way.
    async fn next_view_event<T>(
        &mut self,
        mut accept: impl FnMut(ViewEvent) -> Option<T>,
    ) -> Result<T> {
        let pump = async {
            while let Some(event) = self.view_events.recv().await {
                if let ViewEvent::Prepare(token) = event {
                    self.navigation.on_ready_to_present(token);
                    continue;
                }
                if let Some(found) = accept(event) {
                    return Ok(found);
                }
            }
            bail!("Navigation coordinator stopped")
        };
        timeout(STEP_TIMEOUT, pump)
            .await
            .context("Timed out waiting for the view layer")?
    }

    async fn vote_in(&mut self, category: &str) -> Result<()> {
        self.store
            .send(RootAction::VoteButtonTapped(category.to_string()))?;

        let destination = self
            .next_view_event(|event| match event {
                ViewEvent::Presented(destination) => Some(destination),
                _ => None,
            })
            .await?;

        let vote = destination.route.destination(&self.store);
        vote.send(VoteAction::OnAppear)?;
        let loaded = timeout(
            STEP_TIMEOUT,
            vote.wait_until(|s| {
                s.as_ref()
                    .is_some_and(|v| v.did_load_photos || v.failure.is_some())
            }),
        )
        .await
        .context("Timed out loading photos")??;

        let Some(vote_state) = loaded else {
            bail!("Vote screen for '{}' closed before loading", category);
        };

        if let Some(failure) = &vote_state.failure {
            println!("{category}: search failed: {failure}");
        } else {
            println!("{category}: {} photos", vote_state.photos.len());
            for (index, photo) in vote_state.photos.iter().enumerate() {
                println!("  {:>3}. {} {}", index + 1, photo.id, photo.urls.small);
            }
            match vote_state.photos.get(self.pick.saturating_sub(1)) {
                Some(photo) => {
                    println!("  voting for {}", photo.id);
                    vote.send(VoteAction::SetSelection(photo.id.clone()))?;
                }
                None => println!("  no photo #{}; skipping vote", self.pick),
            }
        }

        vote.send(VoteAction::Dismiss)?;
        self.next_view_event(|event| matches!(event, ViewEvent::Dismissed).then_some(()))
            .await?;
        timeout(STEP_TIMEOUT, self.navigation.wait_for_phase(|phase| phase.is_idle()))
            .await
            .context("Timed out waiting for dismissal")??;
        Ok(())
    }

    async fn run(mut self, categories: Vec<String>) -> Result<()> {
        self.store.send(RootAction::OnAppear)?;
        self.navigation.on_appear();

        for category in &categories {
            self.vote_in(category).await?;
        }

        self.store.send_and_wait(RootAction::SubmitVotes).await?;
        let state = self.store.state();
        println!();
        for category in &state.categories {
            let vote = state.vote_dict.get(category).map(String::as_str).unwrap_or("");
            let mark = if state.has_voted(category) { "x" } else { " " };
            println!("[{mark}] {category} {vote}");
        }
        if state.show_success_toast {
            println!("Votes submitted!");
        } else {
            println!("Vote in each category before submitting");
        }

        self.navigation.shutdown();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if !args.categories.is_empty() {
        config.vote.categories = args.categories.clone();
        config.validate().context("Invalid --category list")?;
    }
    if config.api.access_key.is_none() {
        tracing::warn!("No access key configured; searches will be rejected");
    }

    let scheduler: Arc<dyn Scheduler> =
        Arc::new(TokioScheduler::try_current().context("No tokio runtime")?);
    let environment = RootEnvironment::live(&config.api)?;
    let store = Store::new(
        RootState::new(&config.vote),
        root_reducer(),
        environment,
        Arc::clone(&scheduler),
    );

    let (view_tx, view_rx) = mpsc::unbounded_channel();
    let navigation = NavigationCoordinator::spawn(
        store.clone(),
        HeadlessView { events: view_tx },
        &scheduler,
    );

    let driver = Driver {
        store,
        navigation,
        view_events: view_rx,
        pick: args.pick,
    };

    tokio::select! {
        result = driver.run(config.vote.categories.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    }
}
