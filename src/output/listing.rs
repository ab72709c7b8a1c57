//! Plain-text listing of completed records

use crate::storage::CarRecord;

/// Formats one record as an indented block
pub fn format_record(record: &CarRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", record.identity));
    out.push_str(&format!(
        "  title: {}\n",
        record.title.as_deref().unwrap_or("-")
    ));
    if let Some(subtitle) = &record.subtitle {
        out.push_str(&format!("  subtitle: {}\n", subtitle));
    }
    match record.price {
        Some(price) => out.push_str(&format!("  price: {} €\n", price)),
        None => out.push_str("  price: -\n"),
    }
    if let Some(fairness) = &record.price_fairness {
        out.push_str(&format!("  price fairness: {}\n", fairness));
    }
    for (name, value) in record.attributes.entries() {
        out.push_str(&format!("  {}: {}\n", name, value));
    }

    out
}

/// Prints every record to stdout, blank-line separated
pub fn print_records(records: &[CarRecord]) {
    for record in records {
        println!("{}", format_record(record));
    }
    println!("{} completed records", records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Attributes;
    use crate::RecordState;

    #[test]
    fn test_format_record() {
        let record = CarRecord {
            id: 7,
            identity: "https://cars.example.com/detail?id=7".to_string(),
            state: RecordState::Completed,
            title: Some("Kia EV6".to_string()),
            subtitle: None,
            price: Some(41000),
            price_fairness: Some("Buen precio".to_string()),
            attributes: Attributes {
                previous_owners: Some(1),
                ..Attributes::default()
            },
            discovered_at: "2024-01-01T00:00:00Z".to_string(),
            discovered_run: 1,
            detailed_at: None,
        };

        assert_eq!(
            format_record(&record),
            "https://cars.example.com/detail?id=7\n\
             \x20 title: Kia EV6\n\
             \x20 price: 41000 €\n\
             \x20 price fairness: Buen precio\n\
             \x20 previousOwners: 1\n"
        );
    }
}
