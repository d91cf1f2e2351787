// Simple command-line application to play chess

use ravenchess::{board::PrettyStyle, Color, Game, Move};
use std::io::{self, BufRead, Write};

fn main() {
    let mut stdin = io::stdin().lock();

    let mut game = Game::new();

    loop {
        let moves = game.legal_moves();

        println!("{}", game.pretty(PrettyStyle::Ascii));
        if game.is_checkmate() {
            let winner = match game.side_to_move() {
                Color::White => "Black",
                Color::Black => "White",
            };
            println!("Checkmate, {} wins. Type \"new\" or \"quit\".", winner);
        } else if game.is_stalemate() {
            println!("Stalemate. Type \"new\" or \"quit\".");
        } else if game.in_check() {
            println!("Check!");
        }

        let side = match game.side_to_move() {
            Color::White => "White",
            Color::Black => "Black",
        };
        print!("{} move ({}): ", side, game.len() / 2 + 1);
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();

        match s {
            "quit" => break,
            "new" => {
                game = Game::new();
                continue;
            }
            "undo" => {
                if game.pop().is_none() {
                    println!("Nothing to undo.");
                }
                println!();
                continue;
            }
            _ => {}
        }

        let mv = match Move::from_text(s, game.board()) {
            Ok(mv) => mv,
            Err(e) => {
                println!("Bad move: {}", e);
                println!();
                continue;
            }
        };

        // A parsed move carries no castling or en passant marks, so look it
        // up in the legal list and play the one found there.
        match moves.iter().find(|m| **m == mv) {
            Some(&found) => game.push(found),
            None => println!("Illegal move: {}", mv),
        }

        println!();
    }
}
