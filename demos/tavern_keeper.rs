/// Tavern Keeper example — a custom domain layered over the bundled tables.
///
/// Adds a `tavern` domain with its own tables and English/Portuguese texts,
/// borrows the bundled `character_name` and `personality` tables for the
/// keeper, then rolls a few taverns and a patron's spell in both locales.
///
/// Run with: cargo run --example tavern_keeper

use maze_rats_lab::core::composer::Generator;
use maze_rats_lab::core::random::SeededSource;
use maze_rats_lab::core::registry::TableRegistry;
use maze_rats_lab::schema::domain::DomainSchema;
use maze_rats_lab::schema::locale::LocaleBundle;
use maze_rats_lab::schema::table::{Entry, Payload, Table};

fn main() {
    // --- Tavern tables ---
    let mut tables = TableRegistry::new();
    tables
        .register(Table::new(
            "tavern_name",
            vec![
                Entry::new(Payload::patterned(
                    "tavern.pattern",
                    vec![Payload::reference("tavern_adjective"), Payload::reference("tavern_noun")],
                ))
                .with_weight(3),
                Entry::new(Payload::key("tavern.name.rat_and_lantern")),
            ],
        ))
        .expect("tavern_name");
    tables
        .register(Table::uniform(
            "tavern_adjective",
            [
                Payload::key("tavern.adjective.drowned"),
                Payload::key("tavern.adjective.golden"),
                Payload::key("tavern.adjective.rusty"),
                Payload::key("tavern.adjective.sleeping"),
            ],
        ))
        .expect("tavern_adjective");
    tables
        .register(Table::uniform(
            "tavern_noun",
            [
                Payload::key("tavern.noun.goat"),
                Payload::key("tavern.noun.kettle"),
                Payload::key("tavern.noun.crown"),
                Payload::key("tavern.noun.wyrm"),
            ],
        ))
        .expect("tavern_noun");
    tables
        .register(Table::uniform(
            "keeper",
            [Payload::record([
                ("name", Payload::reference("character_name")),
                ("personality", Payload::reference("personality")),
            ])],
        ))
        .expect("keeper");
    tables
        .register(Table::new(
            "house_special",
            vec![
                Entry::new(Payload::key("tavern.special.eel_pie")).with_weight(2),
                Entry::new(Payload::key("tavern.special.mushroom_stew")).with_weight(2),
                Entry::new(Payload::key("tavern.special.mystery_meat")),
            ],
        ))
        .expect("house_special");

    let tavern = DomainSchema::new("tavern")
        .field("name", "tavern_name")
        .field("keeper", "keeper")
        .field("special", "house_special");

    // --- Texts ---
    let en = LocaleBundle::new("en")
        .with("tavern.pattern", "The {0} {1}")
        .with("tavern.name.rat_and_lantern", "The Rat and Lantern")
        .with("tavern.adjective.drowned", "Drowned")
        .with("tavern.adjective.golden", "Golden")
        .with("tavern.adjective.rusty", "Rusty")
        .with("tavern.adjective.sleeping", "Sleeping")
        .with("tavern.noun.goat", "Goat")
        .with("tavern.noun.kettle", "Kettle")
        .with("tavern.noun.crown", "Crown")
        .with("tavern.noun.wyrm", "Wyrm")
        .with("tavern.special.eel_pie", "Eel pie")
        .with("tavern.special.mushroom_stew", "Mushroom stew")
        .with("tavern.special.mystery_meat", "Mystery meat");
    let pt_br = LocaleBundle::new("pt-BR")
        .with("tavern.pattern", "{1} {0}")
        .with("tavern.name.rat_and_lantern", "O Rato e a Lanterna")
        .with("tavern.adjective.drowned", "Afogado")
        .with("tavern.adjective.golden", "Dourado")
        .with("tavern.adjective.rusty", "Enferrujado")
        .with("tavern.adjective.sleeping", "Adormecido")
        .with("tavern.noun.goat", "O Bode")
        .with("tavern.noun.kettle", "O Caldeirão")
        .with("tavern.noun.crown", "A Coroa")
        .with("tavern.noun.wyrm", "O Dragão")
        .with("tavern.special.eel_pie", "Torta de enguia")
        .with("tavern.special.mushroom_stew", "Ensopado de cogumelos")
        .with("tavern.special.mystery_meat", "Carne misteriosa");

    let generator = Generator::builder()
        .with_bundled_data()
        .with_tables(tables)
        .with_domains([tavern])
        .with_locales([en, pt_br])
        .build()
        .expect("Failed to build generator");

    // --- Roll ---
    let mut source = SeededSource::new(1987);
    for locale in ["en", "pt-BR"] {
        println!("=== {} ===\n", locale);
        for _ in 0..3 {
            let tavern = generator
                .generate("tavern", locale, &mut source)
                .expect("tavern generation");
            println!("{}", tavern["name"]);
            if let Some(keeper) = tavern["keeper"].as_tree() {
                println!("  keeper:  {} ({})", keeper["name"], keeper["personality"]);
            }
            println!("  special: {}", tavern["special"]);
        }

        let spell = generator
            .spell(locale, &mut source)
            .expect("spell generation");
        println!("\nA patron offers to teach you {}.", spell["name"]);
        println!("  side effect: {}\n", spell["side_effect"]);
    }
}
