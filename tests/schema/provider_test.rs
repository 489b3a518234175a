#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::{Arc, LazyLock};
    use std::thread;

    use startorm::config::DefinitionSettings;
    use startorm::model::{Entity, EntityDescriptor, EntityType, Member, Value};
    use startorm::schema::{
        definition_of, AnnotationDefinitionProvider, AttributeKind, EntityDefinitionProvider,
        EntityReference,
    };
    use startorm::OrmError;

    use super::common::*;

    fn reference_names(provider: &AnnotationDefinitionProvider) -> Vec<String> {
        definition_of::<DomainAggregateRow>(provider)
            .all_attributes()
            .iter()
            .map(|a| a.reference_name().to_string())
            .collect()
    }

    #[test]
    fn test_attribute_order() {
        let provider = AnnotationDefinitionProvider::new();

        assert_eq!(
            reference_names(&provider),
            vec![
                "DomainAggregateId",
                "Name",
                "Description",
                "CategoryAttributeId",
                "SubContainerId",
                "CreatedByDomainIdentityId",
                "LastModifiedByDomainIdentityId",
                "CategoryAttributeName",
                "SubContainer",
                "SubContainerSubContainerId",
                "SubContainerTopContainerId",
                "SubContainerName",
                "TopContainer",
                "SubContainerTopContainerTopContainerId",
                "SubContainerTopContainerName",
                "CreatedBy",
                "CreatedByDomainIdentityId",
                "CreatedByUniqueIdentifier",
                "CreatedByFirstName",
                "CreatedByLastName",
                "LastModifiedBy",
                "LastModifiedByDomainIdentityId",
                "LastModifiedByUniqueIdentifier",
                "LastModifiedByFirstName",
                "LastModifiedByLastName",
            ]
        );
    }

    #[test]
    fn test_ordinals_follow_resolution_order() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        for (index, attribute) in definition.all_attributes().iter().enumerate() {
            assert_eq!(attribute.ordinal(), index, "{}", attribute);
        }
    }

    #[test]
    fn test_root_location() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        assert_eq!(definition.entity_name(), "DomainAggregate");
        assert_eq!(definition.entity_container(), Some("dbo"));
        assert_eq!(definition.qualified_name(), "dbo.DomainAggregate");
        assert_eq!(definition.entity_location().alias(), None);
    }

    #[test]
    fn test_attribute_groups() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        let names = |attrs: Vec<&startorm::schema::EntityAttributeDefinition>| -> Vec<String> {
            attrs.iter().map(|a| a.reference_name().to_string()).collect()
        };

        assert_eq!(definition.direct_attributes().count(), 7);
        assert_eq!(
            names(definition.primary_key_attributes().collect()),
            vec!["DomainAggregateId"]
        );
        assert_eq!(
            definition.row_identity().map(|a| a.property_name()),
            Some("DomainAggregateId")
        );
        assert_eq!(
            names(definition.insertable_attributes().collect()),
            vec![
                "Name",
                "Description",
                "CategoryAttributeId",
                "SubContainerId",
                "CreatedByDomainIdentityId",
                "LastModifiedByDomainIdentityId",
            ]
        );
        assert_eq!(definition.updateable_attributes().count(), 6);
        assert_eq!(
            names(definition.related_attributes().collect()),
            vec!["CategoryAttributeName"]
        );
        assert_eq!(
            names(definition.relation_attributes().collect()),
            vec!["SubContainer", "TopContainer", "CreatedBy", "LastModifiedBy"]
        );
        assert_eq!(definition.returnable_attributes().count(), 21);
    }

    #[test]
    fn test_direct_column_physical_name_override() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        let description = definition
            .find(&DomainAggregateRow::DESCRIPTION.to_ref())
            .unwrap();
        assert_eq!(description.physical_name(), "DomainDescription");
        assert_eq!(description.alias(), Some("Description"));
        assert!(description.is_direct());
    }

    #[test]
    fn test_related_attribute_physical_name_override() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        let related = definition
            .find(&DomainAggregateRow::CATEGORY_ATTRIBUTE_NAME.to_ref())
            .unwrap();
        assert_eq!(related.physical_name(), "Name");
        assert_ne!(related.physical_name(), related.property_name());
        assert_eq!(related.kind(), AttributeKind::Related { explicit: true });
        assert!(related.is_explicit_related());

        let owner = related.entity();
        assert!(owner.is_virtual());
        assert_eq!(owner.name(), "CategoryAttribute");
        assert_eq!(owner.entity_type(), EntityType::of::<CategoryAttributeRow>());
        assert_eq!(related.declaring_location().name(), "DomainAggregate");
        assert_eq!(
            related.declaring_type(),
            EntityType::of::<DomainAggregateRow>()
        );
    }

    #[test]
    fn test_nested_relation_paths() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        let top_name = definition
            .find_by_name("subcontainertopcontainername")
            .unwrap();
        let path: Vec<String> = top_name
            .entity_path()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(
            path,
            vec!["dbo.DomainAggregate", "dbo.SubContainer", "dbo.TopContainer"]
        );
        assert_eq!(top_name.physical_name(), "Name");

        let created_by = definition
            .find_by_name("CreatedByFirstName")
            .unwrap();
        assert_eq!(created_by.entity().to_string(), "dbo.DomainIdentity AS CreatedBy");
        assert_eq!(created_by.to_string(), "CreatedBy.FirstName AS CreatedByFirstName");
    }

    #[test]
    fn test_relation_marker_has_no_alias() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);

        let marker = definition.find(&DomainAggregateRow::CREATED_BY.to_ref()).unwrap();
        assert!(marker.is_relation());
        assert_eq!(marker.alias(), None);
        assert_eq!(marker.physical_name(), "CreatedBy");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let provider = AnnotationDefinitionProvider::new();
        let first = provider.resolve_definitions(EntityType::of::<DomainAggregateRow>());
        let second = provider.resolve_definitions(EntityType::of::<DomainAggregateRow>());
        assert_eq!(first, second);

        let other = AnnotationDefinitionProvider::new();
        let third = other.resolve_definitions(EntityType::of::<DomainAggregateRow>());
        assert_eq!(first, third);
    }

    #[test]
    fn test_definitions_are_cached() {
        let provider = AnnotationDefinitionProvider::new();
        let first = definition_of::<DomainAggregateRow>(&provider);
        let second = definition_of::<DomainAggregateRow>(&provider);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.cached_definitions(), 1);
    }

    #[test]
    fn test_concurrent_resolution_yields_one_definition() {
        let provider = AnnotationDefinitionProvider::new();

        let resolved: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| definition_of::<DomainAggregateRow>(&provider)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for definition in &resolved[1..] {
            assert!(Arc::ptr_eq(&resolved[0], definition));
        }
        assert_eq!(provider.cached_definitions(), 1);
    }

    #[test]
    fn test_aliased_reference() {
        let provider = AnnotationDefinitionProvider::new();
        let reference =
            EntityReference::of::<DomainIdentityRow>().with_alias(Some("CreatedBy"));
        let definition = provider.resolve_reference(&reference);

        assert_eq!(definition.entity_location().alias(), Some("CreatedBy"));
        assert_eq!(definition.entity_location().reference_name(), "CreatedBy");
        assert_eq!(definition.entity_reference(), &reference);

        let plain = definition_of::<DomainIdentityRow>(&provider);
        assert!(!Arc::ptr_eq(&definition, &plain));
        assert_eq!(provider.cached_definitions(), 2);
    }

    #[test]
    fn test_alias_matching_table_name_is_dropped() {
        let provider = AnnotationDefinitionProvider::new();
        let reference = EntityReference::of::<SubContainerRow>().with_alias(Some("subcontainer"));

        assert_eq!(provider.get_entity_location(&reference).alias(), None);
    }

    #[test]
    fn test_missing_table_falls_back_to_namespace() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<LooseRow>(&provider);
        let entity_type = EntityType::of::<LooseRow>();

        assert_eq!(definition.entity_name(), "LooseRow");
        assert_eq!(definition.entity_container(), Some(entity_type.namespace()));
        assert!(entity_type.namespace().ends_with("common"));
        assert_eq!(definition.primary_key_attributes().count(), 0);
    }

    struct SchemalessRow {
        id: i64,
    }

    impl Entity for SchemalessRow {
        fn descriptor() -> &'static EntityDescriptor {
            static DESCRIPTOR: LazyLock<EntityDescriptor> = LazyLock::new(|| {
                EntityDescriptor::builder::<SchemalessRow>()
                    .table(None, "Schemaless")
                    .member(Member::column("Id", |r: &SchemalessRow| r.id.into()).primary_key())
                    .build()
            });
            &DESCRIPTOR
        }
    }

    #[test]
    fn test_missing_schema_falls_back_to_namespace() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<SchemalessRow>(&provider);

        assert_eq!(definition.entity_name(), "Schemaless");
        assert_eq!(
            definition.entity_container(),
            Some(EntityType::of::<SchemalessRow>().namespace())
        );
        assert_eq!(
            definition.all_attributes()[0]
                .get_value(&SchemalessRow { id: 5 } as &dyn Any)
                .unwrap(),
            Value::Int(5)
        );
    }

    struct NodeRow {
        node_id: i64,
        parent: Option<Box<NodeRow>>,
    }

    impl Entity for NodeRow {
        fn descriptor() -> &'static EntityDescriptor {
            static DESCRIPTOR: LazyLock<EntityDescriptor> = LazyLock::new(|| {
                EntityDescriptor::builder::<NodeRow>()
                    .table(Some("dbo"), "Node")
                    .member(Member::column("NodeId", |r: &NodeRow| r.node_id.into()).primary_key())
                    .member(Member::relation(
                        "Parent",
                        |r: &NodeRow| r.parent.as_deref(),
                        |r: &mut NodeRow| r.parent.as_deref_mut(),
                    ))
                    .build()
            });
            &DESCRIPTOR
        }
    }

    #[test]
    fn test_recursive_relation_is_skipped() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<NodeRow>(&provider);

        let names: Vec<&str> = definition
            .all_attributes()
            .iter()
            .map(|a| a.property_name())
            .collect();
        assert_eq!(names, vec!["NodeId"]);
    }

    #[test]
    fn test_with_settings() {
        let provider = AnnotationDefinitionProvider::with_settings(&DefinitionSettings {
            initial_capacity: 4,
        });
        assert_eq!(provider.cached_definitions(), 0);
        definition_of::<TopContainerRow>(&provider);
        assert_eq!(provider.cached_definitions(), 1);
    }

    // =========================================================================
    // Value access through resolved attributes
    // =========================================================================

    #[test]
    fn test_get_value_walks_relations() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);
        let row = sample_aggregate();

        let value = |name: &str| {
            definition
                .find_by_name(name)
                .unwrap()
                .get_value(&row as &dyn Any)
        };

        assert_eq!(value("DomainAggregateId").unwrap(), Value::Int(42));
        assert_eq!(value("Description").unwrap(), Value::from("An aggregate"));
        assert_eq!(value("CategoryAttributeName").unwrap(), Value::from("Category"));
        assert_eq!(value("SubContainerName").unwrap(), Value::from("Sub"));
        assert_eq!(value("SubContainerTopContainerName").unwrap(), Value::from("Top"));
        assert_eq!(value("CreatedByFirstName").unwrap(), Value::from("Ada"));
        assert_eq!(value("SubContainer").unwrap(), Value::Null);
    }

    #[test]
    fn test_get_value_missing_relation() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);
        let row = sample_aggregate();

        let err = definition
            .find_by_name("LastModifiedByFirstName")
            .unwrap()
            .get_value(&row as &dyn Any)
            .unwrap_err();
        assert!(matches!(err, OrmError::MissingRelation { relation, .. } if relation == "LastModifiedBy"));
    }

    #[test]
    fn test_get_relation() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);
        let row = sample_aggregate();

        let sub = definition
            .find(&DomainAggregateRow::SUB_CONTAINER.to_ref())
            .unwrap()
            .get_relation(&row as &dyn Any)
            .unwrap()
            .and_then(|r| r.downcast_ref::<SubContainerRow>())
            .unwrap();
        assert_eq!(sub.name, "Sub");

        let missing = definition
            .find(&DomainAggregateRow::LAST_MODIFIED_BY.to_ref())
            .unwrap()
            .get_relation(&row as &dyn Any)
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_set_value() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);
        let mut row = sample_aggregate();

        definition
            .find_by_name("Name")
            .unwrap()
            .set_value(&mut row as &mut dyn Any, Value::from("Renamed"))
            .unwrap();
        definition
            .find_by_name("CreatedByFirstName")
            .unwrap()
            .set_value(&mut row as &mut dyn Any, Value::from("Grace"))
            .unwrap();

        assert_eq!(row.name, "Renamed");
        assert_eq!(row.created_by.as_ref().unwrap().first_name, "Grace");
    }

    #[test]
    fn test_set_value_errors() {
        let provider = AnnotationDefinitionProvider::new();
        let definition = definition_of::<DomainAggregateRow>(&provider);
        let mut row = sample_aggregate();

        let err = definition
            .find_by_name("CreatedByLastName")
            .unwrap()
            .set_value(&mut row as &mut dyn Any, Value::from("Hopper"))
            .unwrap_err();
        assert!(matches!(err, OrmError::MissingSetter { attribute, .. } if attribute == "LastName"));

        let err = definition
            .find_by_name("Name")
            .unwrap()
            .set_value(&mut row as &mut dyn Any, Value::Int(3))
            .unwrap_err();
        assert!(matches!(err, OrmError::ValueConversion { .. }));

        let err = definition
            .find_by_name("LastModifiedByFirstName")
            .unwrap()
            .set_value(&mut row as &mut dyn Any, Value::from("Grace"))
            .unwrap_err();
        assert!(matches!(err, OrmError::MissingRelation { .. }));
    }
}
