//! Prints the basic-strategy lookup charts of the configured strategist,
//! in the form the `BasicStrategist` tables are written in, together with
//! the configured bettor's opening bet on a fresh shoe.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use rewards::bettor::create_bettor;
use rewards::strategy::{create_strategist, Strategist};
use rewards::{CardCount, Rule};
use rewards_drivers::{logging::init_logging, Config};

const DEFAULT_CONFIG_PATH: &str = "~/.rewards.yml";

/// The dealer up-card columns, ending with the ace.
const DEALER_COLUMNS: [u16; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let mut args = CommandLineArgs::parse();
    if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().context("cannot find the home directory")?;
        let config_file_path = home_dir.join(".rewards.yml");
        anyhow::ensure!(
            config_file_path.is_file(),
            "no config file at {}",
            config_file_path.display()
        );
        args.config = config_file_path.display().to_string();
    }
    let args = args;

    init_logging(args.verbose);
    let config = Config::load(&args.config)?;
    let rule: Rule = config.rule.try_into()?;
    let shoe = CardCount::with_decks(rule.shoe_size);

    info!(
        strategist = ?config.bot.strategist,
        decks = rule.shoe_size,
        "generating strategy charts on a fresh shoe"
    );
    let mut strategist = create_strategist(config.bot.strategist, &rule)?;

    println!("static BASIC_ACE_CHART: [[Decision; 10]; 10] = [");
    println!("    // 2  3  4  5  6  7  8  9  10 A");
    for player_total in 12..=21 {
        print_move_row(strategist.as_mut(), player_total, 1, &shoe);
    }
    println!("];\n");

    println!("static BASIC_HIT_CHART: [[Decision; 10]; 19] = [");
    println!("    // 2  3  4  5  6  7  8  9  10 A");
    for player_total in 3..=21 {
        print_move_row(strategist.as_mut(), player_total, 0, &shoe);
    }
    println!("];\n");

    println!("static BASIC_SPLIT_CHART: [[bool; 10]; 10] = [");
    println!("    //  2      3      4      5      6      7      8      9      10     A");
    print_split_row(strategist.as_mut(), 12, 1, &shoe, "A,A");
    for player_card in 2..=10 {
        let total = 2 * player_card;
        print_split_row(strategist.as_mut(), total, 0, &shoe, &total.to_string());
    }
    println!("];\n");
    strategist.free_mem();

    let mut bettor = create_bettor(config.bot.bettor, &rule)?;
    let bet = bettor.get_bet_size(rule.agent_chips, &shoe);
    info!(
        bettor = ?config.bot.bettor,
        chips = rule.agent_chips,
        bet,
        "opening bet on the fresh shoe"
    );

    Ok(())
}

fn print_move_row(
    strategist: &mut dyn Strategist,
    player_total: u16,
    player_aces: u16,
    shoe: &CardCount,
) {
    let mut moves = Vec::with_capacity(DEALER_COLUMNS.len());
    for dealer_total in DEALER_COLUMNS {
        let letter = if strategist.should_double(player_total, player_aces, dealer_total, shoe) {
            'D'
        } else if strategist.should_hit(player_total, player_aces, dealer_total, shoe) {
            'H'
        } else {
            'S'
        };
        moves.push(letter.to_string());
    }
    println!("    [{}], // {}", moves.join(", "), player_total);
}

fn print_split_row(
    strategist: &mut dyn Strategist,
    player_total: u16,
    player_aces: u16,
    shoe: &CardCount,
    label: &str,
) {
    let mut cells = Vec::with_capacity(DEALER_COLUMNS.len());
    for dealer_total in DEALER_COLUMNS {
        let split = strategist.should_split(player_total, player_aces, dealer_total, shoe);
        cells.push(if split { "true " } else { "false" }.to_string());
    }
    println!("    [{}], // {}", cells.join(", "), label);
}
