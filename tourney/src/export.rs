//! CSV export of player registrations.
//!
//! Produces the administrative download: one row per registration held by a
//! player, under the header `Player,College,Tournament`.

use std::io;

use crate::registry::PlayerRegistration;

/// Header row of the export
pub const HEADER: [&str; 3] = ["Player", "College", "Tournament"];

/// Suggested download name
pub const FILE_NAME: &str = "player_registrations.csv";

/// Write the export to any writer. A missing college becomes an empty field.
pub fn write_player_registrations<W: io::Write>(
    writer: W,
    rows: &[PlayerRegistration],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record([
            row.username.as_str(),
            row.college.as_deref().unwrap_or(""),
            row.tournament.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the export into a string
pub fn player_registrations_csv(rows: &[PlayerRegistration]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_player_registrations(&mut buf, rows)?;
    String::from_utf8(buf).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(username: &str, college: Option<&str>, tournament: &str) -> PlayerRegistration {
        PlayerRegistration {
            username: username.to_string(),
            college: college.map(str::to_string),
            tournament: tournament.to_string(),
        }
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = player_registrations_csv(&[]).unwrap();
        assert_eq!(csv, "Player,College,Tournament\n");
    }

    #[test]
    fn test_rows_follow_header() {
        let csv = player_registrations_csv(&[
            row("alice", Some("MIT"), "Spring Cup"),
            row("bob", None, "Spring Cup"),
        ])
        .unwrap();
        assert_eq!(
            csv,
            "Player,College,Tournament\nalice,MIT,Spring Cup\nbob,,Spring Cup\n"
        );
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let csv = player_registrations_csv(&[row("carol", Some("Univ. of X, Y"), "Cup \"A\"")])
            .unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Player,College,Tournament"));
        assert_eq!(lines.next(), Some("carol,\"Univ. of X, Y\",\"Cup \"\"A\"\"\""));
    }
}
