use anyhow::Result;
use mana_core::Config;
use mana_search::{LocationSearch, SearchSettings};
use mana_weather::{
    ConfiguredLocation, GeoLocation, GeocodingClient, GeolocationProvider, HttpGeocodingClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Type to search for a city. Commands:
  :pick N   choose result N
  :focus    reopen the last results
  :blur     close the results
  :here     use the configured location
  :quit     exit";

enum Event {
    Line(Option<String>),
    Search(Option<mana_search::SearchMessage>),
    Chosen(Option<GeoLocation>),
}

#[tokio::main]
async fn main() -> Result<()> {
    mana_core::init()?;

    let (config, _) = Config::load_validated()?;
    tracing::info!("Using weather proxy at {}", config.api.base_url);

    let client =
        HttpGeocodingClient::from_config(&config.api)?.with_limit(config.search.result_limit);
    let geolocation = ConfiguredLocation::new(&config.location);

    let (chosen_tx, mut chosen_rx) = mpsc::unbounded_channel();
    let mut search = LocationSearch::new(
        client,
        move |location: GeoLocation| {
            let _ = chosen_tx.send(location);
        },
        SearchSettings::from_config(&config.search),
    );

    println!("Mana Weather");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            message = search.next_message() => Event::Search(message),
            chosen = chosen_rx.recv() => Event::Chosen(chosen),
        };

        match event {
            Event::Line(None) => break,
            Event::Line(Some(line)) => {
                if !handle_line(&mut search, &geolocation, &line).await {
                    break;
                }
            }
            Event::Search(Some(message)) => {
                search.handle_message(message);
                render(&search);
            }
            Event::Search(None) => break,
            Event::Chosen(Some(location)) => {
                println!(
                    "Selected {} ({:.4}, {:.4})",
                    location.display_name, location.lat, location.lon
                );
            }
            Event::Chosen(None) => {}
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Apply one line of input. Returns false when the user asked to quit.
async fn handle_line<C: GeocodingClient>(
    search: &mut LocationSearch<C>,
    geolocation: &ConfiguredLocation,
    line: &str,
) -> bool {
    match line.trim_end_matches(['\r', '\n']) {
        ":quit" | ":q" => return false,
        ":help" => println!("{HELP}"),
        ":focus" => {
            search.on_focus();
            render(search);
        }
        ":blur" => {
            search.dismiss();
            render(search);
        }
        ":here" => match geolocation.current_position().await {
            Ok(pos) => println!("Your location: {:.4}, {:.4}", pos.latitude, pos.longitude),
            Err(e) => println!("{}", mana_core::AppError::from(e).user_message()),
        },
        cmd if cmd.starts_with(":pick") => {
            let picked = cmd
                .trim_start_matches(":pick")
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .is_some_and(|index| search.is_dropdown_open() && search.select_index(index));
            if !picked {
                println!("No such result");
            }
        }
        text => search.on_text_change(text),
    }
    true
}

fn render<C: GeocodingClient>(search: &LocationSearch<C>) {
    let state = search.state();
    if state.loading {
        println!("Searching for {:?}...", state.debounced_query);
    }
    if let Some(error) = &state.error {
        println!("{error}");
    }
    for (i, candidate) in search.visible_candidates().iter().enumerate() {
        println!("  {}. {}", i + 1, candidate.display_name);
    }
}
