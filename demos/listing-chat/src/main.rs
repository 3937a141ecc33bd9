use std::io::{BufRead, Write};

use anyhow::Result;
use futures_util::StreamExt;
use listing_ai_rs::core::{ChatTurn, PropertyListing};
use listing_ai_rs::provider::{Credentials, StudioSettings};
use listing_ai_rs::providers::google::build_studio;

// Run with:
//   GEMINI_API_KEY=... cargo run -p listing-chat
// Then type questions about the listings; an empty line quits.

const LISTINGS: &str = r#"[
  {
    "id": "1",
    "ownerId": "owner-1",
    "title": "Villa with pool in Cocody",
    "description": "Five-bedroom villa with a large garden and swimming pool.",
    "price": 2290000000,
    "location": "Cocody, Abidjan",
    "imageUrl": "https://picsum.photos/seed/villa/800/600",
    "bedrooms": 5,
    "isSold": false,
    "status": "APPROVED"
  },
  {
    "id": "2",
    "ownerId": "owner-2",
    "title": "Downtown apartment",
    "description": "Bright two-bedroom apartment close to the business district.",
    "price": 85000000,
    "location": "Plateau, Abidjan",
    "imageUrl": "https://picsum.photos/seed/apartment/800/600",
    "bedrooms": 2,
    "isSold": true,
    "status": "APPROVED"
  }
]"#;

#[tokio::main]
async fn main() -> Result<()> {
    let listings: Vec<PropertyListing> = serde_json::from_str(LISTINGS)?;
    let studio = build_studio(&StudioSettings::default(), &Credentials::None)?;
    let mut history: Vec<ChatTurn> = Vec::new();

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        let question = line.trim().to_string();

        let mut stream = studio
            .stream_chat_about(&history, &question, &listings)
            .await?;
        let mut answer = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                    answer.push_str(&text);
                }
                Err(err) => {
                    eprintln!("\n[error] {err}");
                    break;
                }
            }
        }
        println!();

        history.push(ChatTurn::user(question));
        history.push(ChatTurn::assistant(answer));
    }
    Ok(())
}
