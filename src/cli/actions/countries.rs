use crate::countries::{countries, search_countries};
use crate::model::Country;

#[derive(Debug)]
pub struct Args {
    pub search: Option<String>,
}

fn line(country: &Country) -> String {
    format!("{}  {:<6} {}", country.code, country.phone_code, country)
}

pub fn execute(args: &Args) {
    let list = match args.search.as_deref() {
        Some(query) => search_countries(query),
        None => countries(),
    };
    if list.is_empty() {
        println!("No country matches");
    }
    for country in &list {
        println!("{}", line(country));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::find_country;

    #[test]
    fn test_line_format() {
        let line = find_country("GH").map(|country| line(&country));
        assert_eq!(line.as_deref(), Some("GH  +233   🇬🇭 Ghana"));
    }
}
