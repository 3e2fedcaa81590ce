use tracing::debug;

use super::cleanup::{
    append_dietary, append_marketing, checkbox, clean_council, clean_district, clean_nickname,
    clean_suffix, clean_unit_number, fix_case, shorten_unit_type,
};
use super::feed::{FeedTable, Row};
use super::NormalizeOptions;
use crate::error::ImportError;
use crate::model::Participant;

/// Column names of the registration export.
pub mod participant_columns {
    pub const REGISTRATION_NUMBER: &str = "Registration Number";
    pub const EVENT_DESCRIPTION: &str = "Event Description";
    pub const PARTICIPANT_TYPE: &str = "Participant Type";
    pub const FIRST_NAME: &str = "First Name";
    pub const LAST_NAME: &str = "Last Name";
    pub const NICKNAME: &str = "Nickname";
    pub const SUFFIX: &str = "Suffix";
    pub const PHONE: &str = "Phone";
    pub const EMAIL: &str = "Email";
    pub const ADDRESS: &str = "Street Address";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const ZIP: &str = "Zip";
    pub const COUNCIL: &str = "Council";
    pub const DISTRICT: &str = "District";
    pub const UNIT_TYPE: &str = "Unit Type";
    pub const UNIT_NUMBER: &str = "Unit Number";
    pub const VEGAN: &str = "Vegan";
    pub const VEGETARIAN: &str = "Vegetarian";
    pub const GLUTEN_FREE: &str = "Gluten Free";
    pub const REGISTERED_BY_FIRST_NAME: &str = "Registered By First Name";
    pub const REGISTERED_BY_LAST_NAME: &str = "Registered By Last Name";
    pub const REGISTERED_BY_EMAIL: &str = "Registered By Email";
    pub const REGISTERED_BY_PHONE: &str = "Registered By Phone";
    pub const HEARD_ABOUT_OTHER: &str = "Heard About: Other";

    /// Marketing checkboxes in the order they are accumulated.
    pub const MARKETING: [(&str, &str); 5] = [
        ("Heard About: Email", "Email"),
        ("Heard About: Website", "Website"),
        ("Heard About: Social Media", "Social Media"),
        ("Heard About: Unit Leader", "Unit Leader"),
        ("Heard About: Roundtable", "Roundtable"),
    ];

    pub const REQUIRED: [&str; 29] = [
        REGISTRATION_NUMBER,
        EVENT_DESCRIPTION,
        PARTICIPANT_TYPE,
        FIRST_NAME,
        LAST_NAME,
        NICKNAME,
        SUFFIX,
        PHONE,
        EMAIL,
        ADDRESS,
        CITY,
        STATE,
        ZIP,
        COUNCIL,
        DISTRICT,
        UNIT_TYPE,
        UNIT_NUMBER,
        VEGAN,
        VEGETARIAN,
        GLUTEN_FREE,
        REGISTERED_BY_FIRST_NAME,
        REGISTERED_BY_LAST_NAME,
        REGISTERED_BY_EMAIL,
        REGISTERED_BY_PHONE,
        MARKETING[0].0,
        MARKETING[1].0,
        MARKETING[2].0,
        MARKETING[3].0,
        MARKETING[4].0,
    ];

    pub const OPTIONAL: [&str; 1] = [HEARD_ABOUT_OTHER];
}

use participant_columns as columns;

/// Event rows for this class number mean a banquet ticket, not a class.
pub const BANQUET_CLASS_NUMBER: i32 = 999;

const REGISTRATION_EVENT_PREFIX: &str = "Conference Registration";

#[derive(Debug, PartialEq, Eq)]
enum Event {
    Registration,
    Class(i32),
    Banquet,
}

/// Registration rows start with the registration event name, class rows with
/// a three digit class number.
fn parse_event(description: &str) -> Option<Event> {
    if description.starts_with(REGISTRATION_EVENT_PREFIX) {
        return Some(Event::Registration);
    }
    let prefix = description.get(..3)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = &description[3..];
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let number = prefix.parse().ok()?;
    Some(if number == BANQUET_CLASS_NUMBER {
        Event::Banquet
    } else {
        Event::Class(number)
    })
}

fn participant_from_row(row: &Row<'_>, options: &NormalizeOptions) -> Participant {
    let first_name = fix_case(
        row.get(columns::FIRST_NAME),
        row.get(columns::REGISTERED_BY_FIRST_NAME),
    );
    let last_name = fix_case(
        row.get(columns::LAST_NAME),
        row.get(columns::REGISTERED_BY_LAST_NAME),
    );
    let nickname = clean_nickname(
        &fix_case(row.get(columns::NICKNAME), ""),
        &first_name,
        &last_name,
    );

    let mut dietary_restrictions = String::new();
    for column in [columns::VEGAN, columns::VEGETARIAN, columns::GLUTEN_FREE] {
        if let Some(value) = checkbox(column, row.get(column)) {
            append_dietary(&mut dietary_restrictions, &value);
        }
    }

    let mut marketing = String::new();
    for (column, label) in columns::MARKETING {
        if let Some(value) = checkbox(label, row.get(column)) {
            append_marketing(&mut marketing, &value);
        }
    }
    append_marketing(&mut marketing, row.get(columns::HEARD_ABOUT_OTHER));

    let council = clean_council(row.get(columns::COUNCIL));
    let district = clean_district(row.get(columns::DISTRICT), &council, &options.home_council);
    let unit_type = shorten_unit_type(row.get(columns::UNIT_TYPE));
    let unit_number = clean_unit_number(row.get(columns::UNIT_NUMBER), &unit_type);

    let registered_by = [
        fix_case(row.get(columns::REGISTERED_BY_FIRST_NAME), ""),
        fix_case(row.get(columns::REGISTERED_BY_LAST_NAME), ""),
    ]
    .join(" ")
    .trim()
    .to_owned();

    Participant {
        last_name,
        first_name,
        suffix: clean_suffix(row.get(columns::SUFFIX)),
        youth: row
            .get(columns::PARTICIPANT_TYPE)
            .eq_ignore_ascii_case("youth"),
        registration_number: row.get(columns::REGISTRATION_NUMBER).to_owned(),
        nickname,
        phone: row.get(columns::PHONE).to_owned(),
        email: row.get(columns::EMAIL).to_owned(),
        address: row.get(columns::ADDRESS).to_owned(),
        city: fix_case(row.get(columns::CITY), ""),
        state: row.get(columns::STATE).to_uppercase(),
        zip: row.get(columns::ZIP).to_owned(),
        council,
        district,
        unit_type,
        unit_number,
        dietary_restrictions,
        marketing,
        registered_by,
        registered_by_email: row.get(columns::REGISTERED_BY_EMAIL).to_owned(),
        registered_by_phone: row.get(columns::REGISTERED_BY_PHONE).to_owned(),
        ..Participant::default()
    }
}

/// Maps the registration export onto participants. A registration row opens a
/// participant, the class rows that follow it add classes. Any structural
/// problem fails the whole feed.
pub fn participants_from_feed(
    table: &FeedTable,
    options: &NormalizeOptions,
) -> Result<Vec<Participant>, ImportError> {
    let index = table.index(&columns::REQUIRED, &columns::OPTIONAL)?;
    let mut participants: Vec<Participant> = Vec::new();
    let mut classes: Vec<Vec<i32>> = Vec::new();

    for (number, cells) in table.data_rows() {
        let row = index.row(number, cells)?;
        let description = row.get(columns::EVENT_DESCRIPTION);
        match parse_event(description) {
            Some(Event::Registration) => {
                participants.push(participant_from_row(&row, options));
                classes.push(Vec::new());
            }
            Some(Event::Class(class)) => classes
                .last_mut()
                .ok_or(ImportError::OrphanClassRow { row: number })?
                .push(class),
            Some(Event::Banquet) => {
                participants
                    .last_mut()
                    .ok_or(ImportError::OrphanClassRow { row: number })?
                    .banquet = true;
            }
            None => {
                return Err(ImportError::UnrecognizedEvent {
                    row: number,
                    description: description.to_owned(),
                })
            }
        }
    }

    for (participant, classes) in participants.iter_mut().zip(classes) {
        participant.set_classes(classes);
    }
    debug!("normalized {} participants", participants.len());
    Ok(participants)
}
