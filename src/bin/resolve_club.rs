use career_quiz_pipeline::club_country::ClubCountryResolver;

// Prints the country each argument resolves to, one line per club.
fn main() {
    let clubs = std::env::args().skip(1).collect::<Vec<_>>();
    if clubs.is_empty() {
        eprintln!("usage: resolve_club <club name>...");
        std::process::exit(2);
    }

    let resolver = ClubCountryResolver::builtin();
    for club in &clubs {
        let resolution = resolver.resolve(club);
        if resolution.is_resolved() {
            println!("{club}\t{}\t{}", resolution.code, resolution.flag);
        } else {
            println!("{club}\t-\tunresolved");
        }
    }

    let missing = resolver.codes_without_flag();
    if !missing.is_empty() {
        eprintln!("codes without a flag glyph: {}", missing.join(", "));
    }
}
