//! Console leaderboard report.

use quizface_store::{Leaderboard, LeaderboardEntry};

/// One ranked leaderboard row.
#[derive(Debug, Clone)]
pub struct Standing {
    pub rank: usize,
    pub name: String,
    pub entry: LeaderboardEntry,
}

impl Standing {
    /// Average score per game, 0.0 for a player with no games.
    pub fn average(&self) -> f32 {
        if self.entry.games_played == 0 {
            0.0
        } else {
            self.entry.total_score as f32 / self.entry.games_played as f32
        }
    }
}

/// Rank players by total score, descending. Equal scores share no defined
/// relative order beyond being adjacent.
pub fn standings(board: &Leaderboard) -> Vec<Standing> {
    let mut rows: Vec<(&String, &LeaderboardEntry)> = board.iter().collect();
    rows.sort_by(|a, b| b.1.total_score.cmp(&a.1.total_score));

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, entry))| Standing {
            rank: i + 1,
            name: name.clone(),
            entry: entry.clone(),
        })
        .collect()
}

/// Render the console leaderboard table.
pub fn render_report(board: &Leaderboard) -> String {
    let rows = standings(board);
    if rows.is_empty() {
        return "Leaderboard is empty — no quizzes completed yet.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<5} {:<20} {:>6} {:>7} {:>7}  {}\n",
        "Rank", "Player", "Games", "Score", "Avg", "Last played"
    ));
    for row in &rows {
        out.push_str(&format!(
            "{:<5} {:<20} {:>6} {:>7} {:>7.1}  {}\n",
            row.rank,
            row.name,
            row.entry.games_played,
            row.entry.total_score,
            row.average(),
            row.entry.last_played
        ));
    }
    out
}
