use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["prixnc-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["prixnc-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["prixnc-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn search_defaults_to_first_page_without_sort() {
    let cli = Cli::try_parse_from(["prixnc-cli", "search", "lait"]).unwrap();
    match cli.command {
        Some(Commands::Search {
            query,
            page,
            size,
            sort,
        }) => {
            assert_eq!(query, "lait");
            assert_eq!(page, 0);
            assert_eq!(size, None);
            assert_eq!(sort, None);
        }
        other => panic!("expected search, got {other:?}"),
    }
}

#[test]
fn search_parses_sort_key() {
    let cli = Cli::try_parse_from([
        "prixnc-cli",
        "search",
        "riz",
        "--page",
        "2",
        "--size",
        "30",
        "--sort",
        "price",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            page: 2,
            size: Some(30),
            sort: Some(SortBy::Price),
            ..
        })
    ));
}

#[test]
fn search_rejects_unknown_sort_key() {
    assert!(Cli::try_parse_from(["prixnc-cli", "search", "riz", "--sort", "cheapest"]).is_err());
}

#[test]
fn details_takes_id_and_name() {
    let cli = Cli::try_parse_from(["prixnc-cli", "details", "42", "Lait UHT"]).unwrap();
    match cli.command {
        Some(Commands::Details { id, name }) => {
            assert_eq!(id, "42");
            assert_eq!(name, "Lait UHT");
        }
        other => panic!("expected details, got {other:?}"),
    }
}

#[test]
fn extract_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "prixnc-cli",
        "extract",
        "liste.png",
        "--lat",
        "-22.27",
        "--lon",
        "166.45",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Extract {
            image,
            lat,
            lon,
            json,
        }) => {
            assert_eq!(image, PathBuf::from("liste.png"));
            assert_eq!(lat, Some(-22.27));
            assert_eq!(lon, Some(166.45));
            assert!(!json);
        }
        other => panic!("expected extract, got {other:?}"),
    }
}

#[test]
fn extract_requires_both_coordinates() {
    assert!(Cli::try_parse_from(["prixnc-cli", "extract", "liste.png", "--lat", "-22.27"]).is_err());
}
