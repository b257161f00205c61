//! Year/category groupings and country counts over a collection snapshot.
//!
//! Both aggregations apply the same per-prize filter: an optional
//! case-insensitive category and an optional year / year range. Prizes whose
//! award year does not resolve to an integer never match.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Laureate, Prize};

/// Filters shared by every aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrizeFilter {
    pub category: Option<String>,
    pub year: Option<i32>,
    pub year_to: Option<i32>,
}

impl PrizeFilter {
    pub fn new(category: Option<String>, year: Option<i32>, year_to: Option<i32>) -> Self {
        Self {
            category,
            year,
            year_to,
        }
    }

    /// Resolved award year of `prize` if it passes the filter.
    pub fn accept(&self, prize: &Prize) -> Option<i32> {
        if let Some(category) = &self.category {
            if !prize.is_category(category) {
                return None;
            }
        }

        let award_year = prize.award_year.resolve()?;
        self.year_in_range(award_year).then_some(award_year)
    }

    pub fn year_in_range(&self, award_year: i32) -> bool {
        match (self.year, self.year_to) {
            (Some(from), Some(to)) => from <= award_year && award_year <= to,
            (Some(year), None) => award_year == year,
            (None, Some(to)) => award_year <= to,
            (None, None) => true,
        }
    }

    /// Short human description, e.g. `Physics, 1970-1980`.
    pub fn describe(&self) -> String {
        let category = self.category.as_deref().unwrap_or("all categories");
        match (self.year, self.year_to) {
            (Some(from), Some(to)) => format!("{}, {}-{}", category, from, to),
            (Some(year), None) => format!("{}, {}", category, year),
            (None, Some(to)) => format!("{}, up to {}", category, to),
            (None, None) => format!("{}, all years", category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub discipline: String,
    pub count: usize,
    pub laureates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroup {
    #[serde(rename = "awardYear")]
    pub award_year: i32,
    pub disciplines: Vec<CategoryGroup>,
}

/// Group matching prizes by award year, then category. Years ascend,
/// categories are lexicographic, names keep collection order. A laureate
/// contributes once per matching prize.
pub fn group_by_year_and_category(laureates: &[Laureate], filter: &PrizeFilter) -> Vec<YearGroup> {
    let mut groups: BTreeMap<i32, BTreeMap<&str, Vec<String>>> = BTreeMap::new();

    for laureate in laureates {
        for prize in &laureate.prizes {
            if prize.category.is_empty() {
                continue;
            }
            let Some(award_year) = filter.accept(prize) else {
                continue;
            };

            groups
                .entry(award_year)
                .or_default()
                .entry(prize.category.as_str())
                .or_default()
                .push(laureate.full_name.clone());
        }
    }

    groups
        .into_iter()
        .map(|(award_year, categories)| YearGroup {
            award_year,
            disciplines: categories
                .into_iter()
                .map(|(discipline, laureates)| CategoryGroup {
                    discipline: discipline.to_string(),
                    count: laureates.len(),
                    laureates,
                })
                .collect(),
        })
        .collect()
}

/// Total number of names across all groups.
pub fn total_entries(groups: &[YearGroup]) -> usize {
    groups
        .iter()
        .flat_map(|group| &group.disciplines)
        .map(|discipline| discipline.count)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Country counts, ranked by count descending. Ties keep the order in which
/// the countries were first encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCounts {
    ranked: Vec<CountryCount>,
}

impl CountryCounts {
    pub fn into_ranked(self) -> Vec<CountryCount> {
        self.ranked
    }

    pub fn total(&self) -> usize {
        self.ranked.iter().map(|entry| entry.count).sum()
    }

    /// Raw `country -> count` mapping.
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.ranked
            .iter()
            .map(|entry| (entry.country.clone(), entry.count))
            .collect()
    }
}

/// Count matching prizes per birth (or founding) country.
pub fn count_by_country(laureates: &[Laureate], filter: &PrizeFilter) -> CountryCounts {
    let mut ranked: Vec<CountryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for laureate in laureates {
        let country = laureate.country_or_unknown();
        for prize in &laureate.prizes {
            if filter.accept(prize).is_none() {
                continue;
            }

            let slot = *index.entry(country).or_insert_with(|| {
                ranked.push(CountryCount {
                    country: country.to_string(),
                    count: 0,
                });
                ranked.len() - 1
            });
            ranked[slot].count += 1;
        }
    }

    // Stable sort keeps first-encountered order among ties.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    CountryCounts { ranked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AwardYear, NewLaureate};

    fn laureate(id: &str, name: &str, country: &str, prizes: Vec<Prize>) -> Laureate {
        NewLaureate {
            full_name: name.to_string(),
            gender: "unknown".to_string(),
            birth_date: String::new(),
            birth_city: String::new(),
            birth_country: country.to_string(),
            prizes,
        }
        .into_laureate(id.to_string())
    }

    fn sample() -> Vec<Laureate> {
        vec![
            laureate("1", "Aage Niels Bohr", "Denmark", vec![Prize::new(1975, "Physics", "m")]),
            laureate("2", "Ben Mottelson", "USA", vec![Prize::new(1975, "Physics", "m")]),
            laureate("3", "John Cornforth", "Australia", vec![Prize::new(1975, "Chemistry", "m")]),
            laureate("4", "Hannes Alfvén", "Sweden", vec![Prize::new(1970, "Physics", "m")]),
            laureate("5", "Burton Richter", "USA", vec![Prize::new(1976, "Physics", "m")]),
            laureate(
                "6",
                "Frederick Sanger",
                "United Kingdom",
                vec![Prize::new(1958, "Chemistry", "m"), Prize::new(1980, "chemistry", "m")],
            ),
            laureate("7", "Mystery", "", vec![Prize::new(1981, "Peace", "m")]),
        ]
    }

    #[test]
    fn test_year_range_table() {
        let both = PrizeFilter::new(None, Some(1970), Some(1980));
        assert!(both.year_in_range(1970));
        assert!(both.year_in_range(1980));
        assert!(!both.year_in_range(1969));
        assert!(!both.year_in_range(1981));

        let exact = PrizeFilter::new(None, Some(1975), Some(1975));
        assert!(exact.year_in_range(1975));
        assert!(!exact.year_in_range(1974));
        assert!(!exact.year_in_range(1976));

        let only_year = PrizeFilter::new(None, Some(1975), None);
        assert!(only_year.year_in_range(1975));
        assert!(!only_year.year_in_range(1976));

        let only_to = PrizeFilter::new(None, None, Some(1975));
        assert!(only_to.year_in_range(1901));
        assert!(only_to.year_in_range(1975));
        assert!(!only_to.year_in_range(1976));

        assert!(PrizeFilter::default().year_in_range(i32::MIN));
    }

    #[test]
    fn test_group_ordering() {
        let groups = group_by_year_and_category(&sample(), &PrizeFilter::new(None, Some(1975), None));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].award_year, 1975);

        let disciplines: Vec<_> = groups[0].disciplines.iter().map(|d| d.discipline.as_str()).collect();
        assert_eq!(disciplines, vec!["Chemistry", "Physics"]);
        assert_eq!(
            groups[0].disciplines[1].laureates,
            vec!["Aage Niels Bohr", "Ben Mottelson"]
        );
        assert_eq!(groups[0].disciplines[1].count, 2);
    }

    #[test]
    fn test_group_years_ascend_and_category_filter_ignores_case() {
        let groups = group_by_year_and_category(
            &sample(),
            &PrizeFilter::new(Some("PHYSICS".into()), None, None),
        );
        let years: Vec<_> = groups.iter().map(|g| g.award_year).collect();
        assert_eq!(years, vec![1970, 1975, 1976]);
        assert_eq!(total_entries(&groups), 4);
    }

    #[test]
    fn test_one_entry_per_qualifying_prize() {
        let curie = laureate(
            "1",
            "Marie Curie",
            "Poland",
            vec![Prize::new(1903, "Physics", "m"), Prize::new(1911, "Chemistry", "m")],
        );
        let groups = group_by_year_and_category(&[curie.clone()], &PrizeFilter::default());
        assert_eq!(total_entries(&groups), 2);

        let counts = count_by_country(&[curie], &PrizeFilter::default());
        assert_eq!(counts.to_map().get("Poland"), Some(&2));
    }

    #[test]
    fn test_unresolvable_years_are_skipped() {
        let mut broken = laureate("1", "Broken", "Chile", vec![Prize::new(1990, "Literature", "m")]);
        broken.prizes[0].award_year = AwardYear::Raw("nineteen ninety".into());

        assert!(group_by_year_and_category(&[broken.clone()], &PrizeFilter::default()).is_empty());
        assert_eq!(count_by_country(&[broken], &PrizeFilter::default()).total(), 0);
    }

    #[test]
    fn test_country_counts_rank_and_default() {
        let counts = count_by_country(&sample(), &PrizeFilter::default());
        let ranked: Vec<_> = counts
            .clone()
            .into_ranked()
            .into_iter()
            .map(|c| (c.country, c.count))
            .collect();

        // USA and United Kingdom tie at 2; USA is encountered first.
        assert_eq!(
            ranked,
            vec![
                ("USA".to_string(), 2),
                ("United Kingdom".to_string(), 2),
                ("Denmark".to_string(), 1),
                ("Australia".to_string(), 1),
                ("Sweden".to_string(), 1),
                ("Unknown".to_string(), 1),
            ]
        );
        assert_eq!(counts.total(), 8);
        assert_eq!(counts.to_map().get("Unknown"), Some(&1));
    }

    #[test]
    fn test_country_counts_with_filters() {
        let counts = count_by_country(
            &sample(),
            &PrizeFilter::new(Some("chemistry".into()), Some(1970), Some(1980)),
        );
        let by_country = counts.to_map();
        assert_eq!(by_country.get("Australia"), Some(&1));
        assert_eq!(by_country.get("United Kingdom"), Some(&1));
        assert_eq!(by_country.get("USA"), None);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let data = sample();
        let filter = PrizeFilter::new(None, None, Some(1980));
        assert_eq!(
            group_by_year_and_category(&data, &filter),
            group_by_year_and_category(&data, &filter)
        );
        assert_eq!(count_by_country(&data, &filter), count_by_country(&data, &filter));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            PrizeFilter::new(Some("Physics".into()), Some(1970), Some(1980)).describe(),
            "Physics, 1970-1980"
        );
        assert_eq!(PrizeFilter::default().describe(), "all categories, all years");
    }
}
