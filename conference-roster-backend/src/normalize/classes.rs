use tracing::debug;

use super::feed::{FeedTable, Row};
use crate::error::ImportError;
use crate::model::{Class, ProgramSet, UnknownProgram};

/// Column names of the class planning spreadsheet.
pub mod class_columns {
    pub const NUMBER: &str = "Number";
    pub const LENGTH: &str = "Length";
    pub const RESPONSIBILITY: &str = "Responsibility";
    pub const TITLE: &str = "Title";
    pub const DESCRIPTION: &str = "Description";
    pub const LOCATION: &str = "Location";
    pub const INSTRUCTORS: &str = "Instructors";
    pub const INSTRUCTOR_EMAILS: &str = "Instructor Emails";
    pub const EVALUATION_CODES: &str = "Evaluation Codes";
    pub const ACCESS_TOKEN: &str = "Access Token";
    pub const PROGRAMS: &str = "Programs";
    pub const CAPACITY: &str = "Capacity";

    pub const REQUIRED: [&str; 12] = [
        NUMBER,
        LENGTH,
        RESPONSIBILITY,
        TITLE,
        DESCRIPTION,
        LOCATION,
        INSTRUCTORS,
        INSTRUCTOR_EMAILS,
        EVALUATION_CODES,
        ACCESS_TOKEN,
        PROGRAMS,
        CAPACITY,
    ];
}

use class_columns as columns;

fn class_from_row(row: &Row<'_>) -> Result<Class, ImportError> {
    let programs = row
        .get(columns::PROGRAMS)
        .parse::<ProgramSet>()
        .map_err(|UnknownProgram(value)| ImportError::UnknownProgram {
            row: row.number(),
            value,
        })?;
    Ok(Class {
        number: row.parse_number(columns::NUMBER, None)?,
        length: row.parse_number(columns::LENGTH, Some(1))?,
        responsibility: row.get(columns::RESPONSIBILITY).to_owned(),
        title: row.get(columns::TITLE).to_owned(),
        description: row.get(columns::DESCRIPTION).to_owned(),
        location: row.get(columns::LOCATION).to_owned(),
        instructor_names: row.list(columns::INSTRUCTORS),
        instructor_emails: row.list(columns::INSTRUCTOR_EMAILS),
        evaluation_codes: row.list(columns::EVALUATION_CODES),
        access_token: row.get(columns::ACCESS_TOKEN).to_owned(),
        programs,
        capacity: row.parse_number(columns::CAPACITY, Some(0))?,
    })
}

/// One class per spreadsheet row. Blank rows are ignored, anything else that
/// does not parse fails the whole feed.
pub fn classes_from_feed(table: &FeedTable) -> Result<Vec<Class>, ImportError> {
    let index = table.index(&columns::REQUIRED, &[])?;
    let classes = table
        .data_rows()
        .map(|(number, cells)| class_from_row(&index.row(number, cells)?))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("normalized {} classes", classes.len());
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Program;

    fn header() -> Vec<String> {
        columns::REQUIRED.iter().map(|c| (*c).to_owned()).collect()
    }

    fn row(cells: [&str; 12]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn spreadsheet_row_becomes_class() {
        let table = FeedTable {
            columns: header(),
            rows: vec![row([
                "301",
                "2",
                "Training",
                "Knots",
                "Square knots and more",
                "Room 4",
                "Ann Lee, Bob Ng",
                "ann@example.org, bob@example.org",
                "K7Q, K7R",
                "tok-301",
                "CUB, SCT",
                "25",
            ])],
        };
        assert_eq!(
            classes_from_feed(&table).unwrap(),
            vec![Class {
                number: 301,
                length: 2,
                responsibility: "Training".to_owned(),
                title: "Knots".to_owned(),
                description: "Square knots and more".to_owned(),
                location: "Room 4".to_owned(),
                instructor_names: vec!["Ann Lee".to_owned(), "Bob Ng".to_owned()],
                instructor_emails: vec![
                    "ann@example.org".to_owned(),
                    "bob@example.org".to_owned()
                ],
                evaluation_codes: vec!["K7Q".to_owned(), "K7R".to_owned()],
                access_token: "tok-301".to_owned(),
                programs: [Program::Cub, Program::Scouts].into_iter().collect(),
                capacity: 25,
            }]
        );
    }

    #[test]
    fn empty_length_and_capacity_take_defaults() {
        let table = FeedTable {
            columns: header(),
            rows: vec![row(["101", "", "", "Intro", "", "", "", "", "", "", "ALL", ""])],
        };
        let class = classes_from_feed(&table).unwrap().remove(0);
        assert_eq!(class.length, 1);
        assert_eq!(class.capacity, 0);
        assert_eq!(class.programs, ProgramSet::all());
    }

    #[test]
    fn bad_number_fails_the_feed() {
        let table = FeedTable {
            columns: header(),
            rows: vec![
                row(["101", "1", "", "", "", "", "", "", "", "", "", ""]),
                row(["1o1", "1", "", "", "", "", "", "", "", "", "", ""]),
            ],
        };
        assert_eq!(
            classes_from_feed(&table),
            Err(ImportError::InvalidNumber {
                row: 2,
                column: columns::NUMBER,
                value: "1o1".to_owned()
            })
        );
    }

    #[test]
    fn empty_number_fails_the_feed() {
        let table = FeedTable {
            columns: header(),
            rows: vec![row(["", "1", "", "Orphan", "", "", "", "", "", "", "", ""])],
        };
        assert_eq!(
            classes_from_feed(&table),
            Err(ImportError::InvalidNumber {
                row: 1,
                column: columns::NUMBER,
                value: String::new()
            })
        );
    }

    #[test]
    fn unknown_program_fails_the_feed() {
        let table = FeedTable {
            columns: header(),
            rows: vec![row(["101", "1", "", "", "", "", "", "", "", "", "Webelos", ""])],
        };
        assert_eq!(
            classes_from_feed(&table),
            Err(ImportError::UnknownProgram {
                row: 1,
                value: "Webelos".to_owned()
            })
        );
    }
}
