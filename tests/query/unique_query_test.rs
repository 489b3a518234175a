#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use startorm::model::Value;
    use startorm::query::{FilterType, UniqueMatch, UniqueQuery};
    use startorm::schema::{AnnotationDefinitionProvider, AttributeLocation};
    use tracing_subscriber::fmt::MakeWriter;

    use super::common::*;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_warnings<R>(f: impl FnOnce() -> R) -> (R, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    #[test]
    fn test_single_primary_key() {
        let provider = AnnotationDefinitionProvider::new();
        let row = sample_aggregate();

        let (query, logs) = with_captured_warnings(|| UniqueQuery::new(&provider, &row).unwrap());

        assert_eq!(query.match_mode(), UniqueMatch::PrimaryKey);
        let filters = query.selection().filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].filter_type(), FilterType::Equality);
        assert_eq!(filters[0].filter_values(), &[Value::Int(42)]);

        let expected: AttributeLocation = DomainAggregateRow::DOMAIN_AGGREGATE_ID.into();
        assert_eq!(filters[0].attribute_location(), &expected);
        assert!(logs.is_empty(), "unexpected warnings: {}", logs);
    }

    #[test]
    fn test_composite_values_come_from_the_item() {
        let provider = AnnotationDefinitionProvider::new();
        let option = AggregateOptionRow {
            aggregate_option_id: 9,
            domain_aggregate_id: 42,
            option_value: "on".into(),
        };

        let query = UniqueQuery::new(&provider, &option).unwrap();
        let selection = query.into_selection();

        assert_eq!(selection.property_values(), vec![&Value::Int(9)]);
        assert_eq!(
            selection.to_string(),
            "AggregateOptionRow.AggregateOptionId=9"
        );
    }

    #[test]
    fn test_no_key_falls_back_to_direct_attributes() {
        let provider = AnnotationDefinitionProvider::new();
        let row = LooseRow {
            code: "A1".into(),
            label: Some("Widget".into()),
            weight: 2.5,
        };

        let (query, logs) = with_captured_warnings(|| UniqueQuery::new(&provider, &row).unwrap());

        assert_eq!(query.match_mode(), UniqueMatch::AllDirectAttributes);
        let filters = query.selection().filters();
        assert_eq!(filters.len(), 3);
        assert!(filters
            .iter()
            .all(|f| f.filter_type() == FilterType::Equality));
        assert_eq!(
            query.selection().property_values(),
            vec![&Value::from("A1"), &Value::from("Widget"), &Value::Float(2.5)]
        );

        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("no primary key declared"), "{}", logs);
        assert!(logs.contains("attributes=3"), "{}", logs);
    }

    #[test]
    fn test_fallback_null_column_becomes_null_check() {
        let provider = AnnotationDefinitionProvider::new();
        let row = LooseRow {
            code: "B2".into(),
            label: None,
            weight: 1.0,
        };

        let query = UniqueQuery::new(&provider, &row).unwrap();
        let types: Vec<FilterType> = query
            .selection()
            .filters()
            .iter()
            .map(|f| f.filter_type())
            .collect();

        assert_eq!(
            types,
            vec![FilterType::Equality, FilterType::IsNotSet, FilterType::Equality]
        );
        assert_eq!(query.selection().property_values().len(), 2);
    }
}
