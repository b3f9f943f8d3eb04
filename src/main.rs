use gerd_companion::CompanionApp;
use gerd_companion::config::{ClientConfig, GenerationConfig};
use gerd_companion::navigation::Screen;
use gerd_companion::onboarding::OnboardingScreen;
use gerd_companion::routing::spawn_cycle_watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env()?;
    let generation = GenerationConfig::from_env()?;

    eprintln!("GERD Companion v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.base_url);
    eprintln!("   Store: {}", config.store_path.display());

    let app = CompanionApp::open(&config, generation).await?;

    // A deep link passed as the first argument is resolved without logging in.
    if let Some(link) = std::env::args().nth(1) {
        match app.open_deep_link(&link) {
            Some(screen) => println!("{}", serde_json::to_string(&screen)?),
            None => eprintln!("   Unrecognized link: {link}"),
        }
        return Ok(());
    }

    let username = std::env::var("GERD_USERNAME").unwrap_or_else(|_| {
        eprintln!("Error: GERD_USERNAME not set");
        std::process::exit(1);
    });
    let password = std::env::var("GERD_PASSWORD").unwrap_or_else(|_| {
        eprintln!("Error: GERD_PASSWORD not set");
        std::process::exit(1);
    });

    app.auth().enter_login_screen().await;
    let mut screen = match app.auth().login(&username, &password).await {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("Login failed: {}", e.user_message());
            std::process::exit(1);
        }
    };

    if matches!(screen, Screen::Onboarding { .. }) {
        // Entering onboarding runs the cycle check, which may pick the
        // update flow instead.
        screen = app.routing().enter_onboarding().await;
    }
    println!("{}", serde_json::to_string(&screen)?);

    let at_generation = matches!(
        screen,
        Screen::Onboarding {
            step: OnboardingScreen::Generating,
            ..
        }
    );
    if at_generation && std::env::var("GERD_RUN_GENERATION").is_ok_and(|v| v == "1") {
        let handle = app.generation_poller().spawn();
        if let Some(outcome) = handle.outcome().await {
            println!("{}", serde_json::to_string(&outcome.next_screen())?);
        }
    }

    if std::env::var("GERD_WATCH_CYCLES").is_ok_and(|v| v == "1") {
        let (_handle, _shutdown, mut decisions) =
            spawn_cycle_watch(app.routing().clone(), config.cycle_check_interval);
        while let Some(decision) = decisions.recv().await {
            if let Some(screen) = decision.screen() {
                println!("{}", serde_json::to_string(&screen)?);
            }
        }
    }

    Ok(())
}
