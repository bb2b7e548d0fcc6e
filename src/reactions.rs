//! Emoji reactions to daily puzzle game scores.
//!
//! Members paste the share text of games like Wordle or Waffle. The
//! [`Reactor`] recognizes them and picks the emoji the bot reacts with: one per
//! matching pattern, in table order.

use log::debug;
use regex::{Regex, RegexBuilder};

/// Score patterns and the emoji they earn.
///
/// Patterns are matched case-insensitive and multi-line.
const REACTIONS: &[(&str, &str)] = &[
    (r"wordle [\d,]+ [1-6]/6", "🧠"),
    (r"wordle [\d,]+ 1/6", "1️⃣"),
    (r"wordle [\d,]+ 2/6", "2️⃣"),
    (r"wordle [\d,]+ X/6", "🐌"),
    (r"daily duotrigordle #\d+\nguesses: \d+/37", "🧠"),
    (r"daily duotrigordle #\d+\nguesses: X/37", "🐌"),
    (r"scholardle \d+ [1-6]/6", "🎓"),
    (r"scholardle \d+ 1/6", "1️⃣"),
    (r"scholardle \d+ 2/6", "2️⃣"),
    (r"scholardle \d+ X/6", "🐌"),
    (r"worldle #\d+ \([\d\.]+\) [1-6]/6 \(100%\)", "🗺️"),
    (r"worldle #\d+ \([\d\.]+\) X/6 \(\d+%\)", "🐌"),
    (r"waffle\d+ [0-5]/5", "🧇"),
    (r"waffle\d+ 5/5", "⭐"),
    (r"waffle\d+ X/5", "🐌"),
    (r"#wafflesilverteam", "🥈"),
    (r"#wafflegoldteam", "🥇"),
    (r"#wafflecenturion", "🌟"),
    (r"#wafflemaster", "🏆"),
    (r"flowdle \d+ \[\d+ moves\]", "🚰"),
    (r"flowdle \d+ \[failed\]", "🐌"),
    (r"jurassic wordle \(game #\d+\) - [1-8] / 8", "🦕"),
    (r"jurassic wordle \(game #\d+\) - X / 8", "🐌"),
    (r"jungdle \(game #\d+\) - [1-8] / 8", "🦁"),
    (r"jungdle \(game #\d+\) - X / 8", "🐌"),
    (r"dogsdle \(game #\d+\) - [1-8] / 8", "🐶"),
    (r"dogsdle \(game #\d+\) - X / 8", "🐌"),
    (r"framed #\d+.*\n+.*🎥 [🟥⬛ ]*🟩", "🎬"),
    (r"framed #\d+.*\n+.*🎥 [🟥⬛ ]+$", "🐌"),
    (r"moviedle #[\d-]+.*\n+.*🎥[🟥⬜⬛️ ]*🟩", "🎬"),
    (r"moviedle #[\d-]+.*\n+.*🎥[🟥⬜⬛️ ]+$", "🐌"),
    (r"posterdle #[\d-]+.*\n+ ⌛ .*\n 🍿.+🟩", "📯"),
    (r"posterdle #[\d-]+.*\n+ ⌛ 0️⃣ .*\n 🍿.+🟩", "0️⃣"),
    (r"posterdle #[\d-]+.*\n+ ⌛ .*\n 🍿 [⬜️🟥⬛️ ]+$", "🐌"),
    (r"namethatride #[\d-]+.*\n+ ⌛ .*\n 🚗.+🟩", "🚙"),
    (r"namethatride #[\d-]+.*\n+ ⌛ .*\n 🚗 [⬜️🟥⬛️ ]+$", "🐌"),
    (r"heardle #\d+.*\n+.*🟩", "👂"),
    (r"heardle #\d+.*\n+🔇", "🐌"),
    (r"flaggle .*\n+.*\d+ pts", "⛳"),
    (r"flaggle .*\n+.*gave up", "🐌"),
    (r"#Polygonle \d+ [1-6]/6[^🟧]+?🟩", "🔷"),
    (r"#Polygonle \d+ [1-6]/6[^🟩]+?🟧", "🔶"),
    (r"#Polygonle \d+ X/6", "🐌"),
    (r"#GuessTheGame #\d+.*\n+.*🎮[🟥⬛🟨 ]*🟩", "🎮"),
    (r"#GuessTheGame #\d+.*\n+.*🎮 [🟥⬛🟨 ]+$", "🐌"),
    (r"https://squaredle\.app/ \d+/\d+:", "🟩"),
    (r"https://squaredle\.app/ .*[^📖]*📖", "📖"),
    (r"https://squaredle\.app/ .*[^⏱️]*⏱️", "⏱️"),
    (r"https://squaredle\.app/ .*[^🎯]*🎯", "🎯"),
    (r"https://squaredle\.app/ .*[^🔥]*🔥", "🔥"),
    (r"Episode #\d+\n+📺 .*🟩", "📺"),
    (r"Episode #\d+\n+📺 [^🟩]+$", "🐌"),
    (r"Birdle #\d+ \d/5", "🐦"),
];

/// Compiled reaction table.
pub struct Reactor {
    table: Vec<(Regex, &'static str)>,
}

impl Reactor {
    /// Compiles the reaction table.
    ///
    /// # Errors
    ///
    /// Fails if one of the patterns is not a valid regex.
    pub fn new() -> Result<Self, regex::Error> {
        let table = REACTIONS
            .iter()
            .map(|(pattern, emoji)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .map(|regex| (regex, *emoji))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("compiled {} reaction patterns", table.len());

        Ok(Reactor { table })
    }

    /// Returns the emoji to react with, in table order.
    ///
    /// The same emoji appears once per matching pattern, so a message can earn
    /// it more than once.
    pub fn reactions(&self, text: &str) -> Vec<&'static str> {
        self.table
            .iter()
            .filter(|(regex, _)| regex.is_match(text))
            .map(|(_, emoji)| *emoji)
            .collect()
    }
}
