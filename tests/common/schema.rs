use lattice::prelude::*;

/// Countries, cities, addresses and customers, plus actors and films linked
/// through a junction table.
///
/// `customer.Country` is a three hop lookup:
/// customer -> address -> city -> country.
pub fn world() -> Schema {
    Schema::new()
        .with_model(
            Model::new("country", "Country", "country")
                .column(Column::new("country_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("country_name", "Name", "name", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(
                    Column::new("country_cities", "Cities", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::has_many(
                            "city",
                            "city_country",
                            "country_id",
                        )),
                )
                .column(
                    Column::new("country_city_count", "City Count", "", LogicalType::Links)
                        .with_options(RelationOptions::has_many(
                            "city",
                            "city_country",
                            "country_id",
                        )),
                )
                .column(
                    Column::new("country_population", "Population", "", LogicalType::Rollup)
                        .with_options(RollupOptions::new(
                            "country_cities",
                            "city_population",
                            RollupFunction::Sum,
                        )),
                )
                .column(
                    Column::new("country_city_names", "City Names", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("country_cities", "city_name")),
                ),
        )
        .with_model(
            Model::new("city", "City", "city")
                .column(Column::new("city_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("city_name", "Name", "name", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(Column::new(
                    "city_country",
                    "Country Id",
                    "country_id",
                    LogicalType::ForeignKey,
                ))
                .column(Column::new(
                    "city_population",
                    "Population",
                    "population",
                    LogicalType::Number,
                ))
                .column(
                    Column::new("city_rel", "Country", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::belongs_to(
                            "country",
                            "city_country",
                            "country_id",
                        )),
                )
                .column(
                    Column::new("city_country_name", "Country Name", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("city_rel", "country_name")),
                ),
        )
        .with_model(
            Model::new("address", "Address", "address")
                .column(Column::new("address_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("address_street", "Street", "street", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(Column::new(
                    "address_city",
                    "City Id",
                    "city_id",
                    LogicalType::ForeignKey,
                ))
                .column(
                    Column::new("address_rel", "City", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::belongs_to(
                            "city",
                            "address_city",
                            "city_id",
                        )),
                )
                .column(
                    Column::new("address_country", "Country Name", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("address_rel", "city_country_name")),
                ),
        )
        .with_model(
            Model::new("customer", "Customer", "customer")
                .column(Column::new("customer_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("customer_name", "Name", "name", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(Column::new(
                    "customer_address",
                    "Address Id",
                    "address_id",
                    LogicalType::ForeignKey,
                ))
                .column(
                    Column::new("customer_rel", "Address", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::belongs_to(
                            "address",
                            "customer_address",
                            "address_id",
                        )),
                )
                .column(
                    Column::new("customer_country", "Country", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("customer_rel", "address_country")),
                ),
        )
        .with_model(
            Model::new("actor", "Actor", "actor")
                .column(Column::new("actor_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("actor_name", "Name", "name", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(
                    Column::new("actor_films", "Films", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::many_to_many(
                            "film",
                            "actor_id",
                            "film_id",
                            JunctionOptions {
                                model: "film_actor".into(),
                                child_column: "fa_actor".into(),
                                parent_column: "fa_film".into(),
                            },
                        )),
                ),
        )
        .with_model(
            Model::new("film", "Film", "film")
                .column(Column::new("film_id", "Id", "id", LogicalType::Id).primary_key())
                .column(
                    Column::new("film_title", "Title", "title", LogicalType::SingleLineText)
                        .primary_value(),
                )
                .column(Column::new("film_year", "Year", "release_year", LogicalType::Year))
                .column(Column::new("film_rating", "Rating", "rating", LogicalType::Rating))
                .column(Column::new("film_length", "Length", "length", LogicalType::Duration)),
        )
        .with_model(
            Model::new("film_actor", "Film Actor", "film_actor")
                .column(Column::new("fa_actor", "Actor Id", "actor_id", LogicalType::ForeignKey))
                .column(Column::new("fa_film", "Film Id", "film_id", LogicalType::ForeignKey)),
        )
        .with_view(
            View::new("big_cities", "city")
                .show(["Name", "Population"])
                .filter(Filter::leaf("Population", FilterOp::Gte, 150_000))
                .sort(Sort::desc("Population")),
        )
}

/// Two models whose lookups read each other.
pub fn cyclic() -> Schema {
    Schema::new()
        .with_model(
            Model::new("a", "A", "a")
                .column(Column::new("a_id", "Id", "id", LogicalType::Id).primary_key())
                .column(Column::new("a_b", "B Id", "b_id", LogicalType::ForeignKey))
                .column(
                    Column::new("a_rel", "B", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::belongs_to("b", "a_b", "b_id")),
                )
                .column(
                    Column::new("a_lookup", "B Lookup", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("a_rel", "b_lookup")),
                ),
        )
        .with_model(
            Model::new("b", "B", "b")
                .column(Column::new("b_id", "Id", "id", LogicalType::Id).primary_key())
                .column(Column::new("b_a", "A Id", "a_id", LogicalType::ForeignKey))
                .column(
                    Column::new("b_rel", "A", "", LogicalType::LinkToAnotherRecord)
                        .with_options(RelationOptions::belongs_to("a", "b_a", "a_id")),
                )
                .column(
                    Column::new("b_lookup", "A Lookup", "", LogicalType::Lookup)
                        .with_options(LookupOptions::new("b_rel", "a_lookup")),
                ),
        )
}
