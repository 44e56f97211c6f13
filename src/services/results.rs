//! Results provider: fixtures and match outcomes from api-sports v3.
//!
//! Raw API payloads are converted to the engine's tagged [`MatchOutcome`] at
//! this boundary; an outcome the API reports in a shape we do not recognize
//! is an error, never a silent default. A small built-in Premier League team
//! table backs up team search when the API is unreachable.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::engine::elimination::MatchOutcome;
use crate::engine::EngineError;

const API_BASE: &str = "https://v3.football.api-sports.io";

/// Statuses that mean a fixture has a final result.
const FINISHED_STATUSES: [&str; 3] = ["FT", "AET", "PEN"];

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRef {
    pub id: i64,
    pub name: String,
}

pub struct FootballApi {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FixturesResponse {
    response: Vec<FixtureEntry>,
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    fixture: FixtureInfo,
    teams: FixtureTeams,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    status: FixtureStatus,
}

#[derive(Debug, Deserialize)]
struct FixtureStatus {
    short: String,
}

#[derive(Debug, Deserialize)]
struct FixtureTeams {
    home: FixtureTeam,
    away: FixtureTeam,
}

#[derive(Debug, Deserialize)]
struct FixtureTeam {
    id: i64,
    name: String,
    winner: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    response: Vec<TeamEntry>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    team: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    id: i64,
    name: String,
}

impl FootballApi {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        }
    }

    /// Find a team by (partial) name within a league. Falls back to the
    /// built-in Premier League table when the API call fails.
    pub async fn search_team(
        &self,
        team_name: &str,
        league_id: i64,
        season: i64,
    ) -> Result<Option<TeamRef>> {
        match self.search_team_api(team_name, league_id, season).await {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!("Team search via API failed: {}. Using fallback data.", e);
                Ok(fallback_team(team_name))
            }
        }
    }

    async fn search_team_api(
        &self,
        team_name: &str,
        league_id: i64,
        season: i64,
    ) -> Result<Option<TeamRef>> {
        let response = self
            .client
            .get(format!("{}/teams", API_BASE))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", "v3.football.api-sports.io")
            .query(&[("league", league_id), ("season", season)])
            .send()
            .await?
            .error_for_status()?;

        let teams: TeamsResponse = response.json().await?;
        let needle = team_name.trim().to_lowercase();
        Ok(teams
            .response
            .into_iter()
            .map(|entry| entry.team)
            .find(|team| team.name.to_lowercase().contains(&needle))
            .map(|team| TeamRef {
                id: team.id,
                name: team.name,
            }))
    }

    /// Fetch the outcome of every fixture in one round, keyed by team id.
    /// A fixture without a final result is an incomplete-results error: the
    /// round cannot be resolved yet.
    pub async fn round_results(
        &self,
        league_id: i64,
        season: i64,
        round_number: i64,
    ) -> Result<HashMap<String, MatchOutcome>> {
        let round = format!("Regular Season - {}", round_number);
        let response = self
            .client
            .get(format!("{}/fixtures", API_BASE))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", "v3.football.api-sports.io")
            .query(&[
                ("league", league_id.to_string()),
                ("season", season.to_string()),
                ("round", round),
            ])
            .send()
            .await?
            .error_for_status()?;

        let fixtures: FixturesResponse = response.json().await?;
        if fixtures.response.is_empty() {
            return Err(anyhow!(
                "no fixtures returned for round {} of league {}",
                round_number,
                league_id
            ));
        }

        let mut results = HashMap::new();
        for entry in fixtures.response {
            if !FINISHED_STATUSES.contains(&entry.fixture.status.short.as_str()) {
                // Unfinished fixture: leave both teams out so the engine
                // surfaces an explicit incomplete-results error.
                continue;
            }
            let (home_outcome, away_outcome) = outcomes_for(&entry.teams)?;
            results.insert(entry.teams.home.id.to_string(), home_outcome);
            results.insert(entry.teams.away.id.to_string(), away_outcome);
        }
        Ok(results)
    }
}

/// Strict conversion of the API's winner flags to tagged outcomes.
fn outcomes_for(teams: &FixtureTeams) -> Result<(MatchOutcome, MatchOutcome)> {
    match (teams.home.winner, teams.away.winner) {
        (Some(true), Some(false)) => Ok((MatchOutcome::Win, MatchOutcome::Loss)),
        (Some(false), Some(true)) => Ok((MatchOutcome::Loss, MatchOutcome::Win)),
        (None, None) | (Some(false), Some(false)) => Ok((MatchOutcome::Draw, MatchOutcome::Draw)),
        (home, away) => Err(EngineError::UnknownOutcome {
            team: teams.home.name.clone(),
            value: format!("winner flags home={:?} away={:?}", home, away),
        }
        .into()),
    }
}

/// Premier League teams used when the API is down, keyed by common name.
fn fallback_team(team_name: &str) -> Option<TeamRef> {
    const TEAMS: [(&str, i64, &str); 20] = [
        ("arsenal", 42, "Arsenal"),
        ("chelsea", 49, "Chelsea"),
        ("liverpool", 40, "Liverpool"),
        ("manchester city", 50, "Manchester City"),
        ("manchester united", 33, "Manchester United"),
        ("tottenham", 47, "Tottenham"),
        ("newcastle", 34, "Newcastle United"),
        ("brighton", 51, "Brighton & Hove Albion"),
        ("aston villa", 66, "Aston Villa"),
        ("west ham", 48, "West Ham United"),
        ("crystal palace", 52, "Crystal Palace"),
        ("fulham", 36, "Fulham"),
        ("wolves", 39, "Wolverhampton Wanderers"),
        ("everton", 45, "Everton"),
        ("brentford", 55, "Brentford"),
        ("nottingham forest", 65, "Nottingham Forest"),
        ("luton", 163, "Luton Town"),
        ("burnley", 44, "Burnley"),
        ("sheffield united", 62, "Sheffield United"),
        ("bournemouth", 35, "AFC Bournemouth"),
    ];

    let needle = team_name.trim().to_lowercase();
    TEAMS
        .iter()
        .find(|(key, _, name)| {
            *key == needle
                || key.contains(needle.as_str())
                || needle.contains(key)
                || name.to_lowercase().contains(&needle)
        })
        .map(|(_, id, name)| TeamRef {
            id: *id,
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_matches_partial_names() {
        let team = fallback_team("spurs");
        assert!(team.is_none());

        let team = fallback_team("man city");
        assert!(team.is_none());

        let team = fallback_team("tottenham").expect("known team");
        assert_eq!(team.id, 47);

        let team = fallback_team("Forest").expect("partial name");
        assert_eq!(team.name, "Nottingham Forest");
    }

    #[test]
    fn unknown_winner_flags_are_rejected() {
        let teams = FixtureTeams {
            home: FixtureTeam {
                id: 1,
                name: "Home".to_string(),
                winner: Some(true),
            },
            away: FixtureTeam {
                id: 2,
                name: "Away".to_string(),
                winner: Some(true),
            },
        };
        assert!(outcomes_for(&teams).is_err());
    }

    #[test]
    fn draw_maps_to_both_teams() {
        let teams = FixtureTeams {
            home: FixtureTeam {
                id: 1,
                name: "Home".to_string(),
                winner: None,
            },
            away: FixtureTeam {
                id: 2,
                name: "Away".to_string(),
                winner: None,
            },
        };
        let (home, away) = outcomes_for(&teams).expect("valid draw");
        assert_eq!(home, MatchOutcome::Draw);
        assert_eq!(away, MatchOutcome::Draw);
    }
}
