//! Command-line front end for position advice and game analysis

use chess_strategist_core::advice::AdviceStatus;
use chess_strategist_core::evaluation::Side;
use chess_strategist_core::parser::parse_pgn_string;
use chess_strategist_core::{
    advice_for, control_map, evaluate, AnalysisCache, AnalysisConfig, AdviceTable,
    BoardPosition,
};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage(&args[0]);
        process::exit(1);
    }

    match args[1].as_str() {
        "fen" => advise_position(&args[2]),
        "pgn" => analyze_pgn(&args[2], args.get(3).map(String::as_str)).await,
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [arguments]", program);
    println!();
    println!("Commands:");
    println!("  fen \"<fen>\"                 Evaluate a position and print advice");
    println!("  pgn <pgn_file> [config]     Analyze the first game of a PGN file");
    println!();
    println!("Examples:");
    println!("  {} fen \"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\"", program);
    println!("  {} pgn immortal.pgn thresholds.json", program);
}

fn advise_position(fen: &str) {
    let position = match BoardPosition::from_fen(fen) {
        Ok(p) => p,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    let evaluation = evaluate(&position);
    let advice = advice_for(&evaluation, Some(&position));

    println!("----------------------------------------");
    println!("   {} to move", Side::from(position.turn()).name());
    if !position.is_legal() {
        println!("   [WARN] Illegal position, activity counts are pseudo-legal");
    }
    for (factor, score) in evaluation.iter() {
        println!(
            "   {:<16} {:>3} vs {:<3} {:>+7.1}%",
            factor.display_name(),
            score.white,
            score.black,
            score.percentage
        );
    }
    println!("----------------------------------------");

    match advice.status {
        AdviceStatus::NoAdvantage => println!("   No significant advantage for either side."),
        AdviceStatus::NotFound => {
            println!("   No advice written for situation '{}'", advice.situation_key)
        }
        _ => {
            if let Some(side) = advice.perspective {
                println!("   Advice for {} [{}]", side.name(), advice.situation_key);
            }
            println!("   {}", advice.diagnosis);
            println!("   {}", advice.prescription);
        }
    }

    let contested = control_map(&position)
        .into_iter()
        .filter(|c| c.white_control > 0 && c.black_control > 0)
        .count();
    println!("   Contested squares: {}", contested);
}

async fn analyze_pgn(file_path: &str, config_path: Option<&str>) {
    let config = match config_path.map(AnalysisConfig::from_json_file) {
        None => AnalysisConfig::default(),
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    let pgn = match fs::read_to_string(file_path) {
        Ok(text) => text,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    let games = match parse_pgn_string(&pgn) {
        Ok(g) => g,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };
    let game = &games[0];

    println!("================================================================");
    println!("{} ({} half-moves)", game.summary(), game.move_count());
    println!("================================================================");

    let cache = AnalysisCache::with_config(config, AdviceTable::shared_builtin());
    let result = match cache
        .analyze_and_cache(&pgn, &game.positions, &game.moves)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    if let Some(phases) = result.game_phases {
        println!("   Opening: {}-{}", phases.opening.start, phases.opening.end);
        if let Some(middlegame) = phases.middlegame {
            println!("   Middlegame: {}-{}", middlegame.start, middlegame.end);
        }
        if let Some(endgame) = phases.endgame {
            println!("   Endgame: {}-{}", endgame.start, endgame.end);
        }
    }
    println!();

    println!("   Strategic periods:");
    for period in &result.periods {
        println!("      {}", period.description);
    }
    println!();

    println!("   Critical moments:");
    for moment in &result.critical_moments {
        println!(
            "      [{}] {:<17} {}",
            moment.significance,
            moment.kind.as_str(),
            moment.description
        );
    }
    println!();

    println!("   Character: {:?}", result.summary.character);
    println!("   Analyzed in {}ms", result.analysis_time_ms);
}
