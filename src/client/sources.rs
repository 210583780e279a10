//! Static source-category tables for agricultural news searches

/// Curated source tiers a bulletin can restrict its searches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    Academicas,
    Cientificas,
    Gubernamentales,
    Noticias,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 4] = [
        SourceCategory::Academicas,
        SourceCategory::Cientificas,
        SourceCategory::Gubernamentales,
        SourceCategory::Noticias,
    ];

    /// Display label as it appears on bulletin forms
    pub fn label(&self) -> &'static str {
        match self {
            SourceCategory::Academicas => "Académicas",
            SourceCategory::Cientificas => "Científicas",
            SourceCategory::Gubernamentales => "Gubernamentales",
            SourceCategory::Noticias => "Noticias",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Source domains queried for this category. Some domains appear in
    /// more than one category; unions must dedup.
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            SourceCategory::Academicas => &[
                "redalyc.org",
                "dialnet.unirioja.es",
                "academia.edu",
                "researchgate.net",
                "jstor.org",
                "eric.ed.gov",
                "agronomia.uchile.cl",
                "scielo.org",
                "latindex.org",
            ],
            SourceCategory::Cientificas => &[
                "scielo.org",
                "redalyc.org",
                "dialnet.unirioja.es",
                "fao.org",
                "inia.cl",
                "agronomia.uchile.cl",
                "sciencedirect.com",
                "springer.com",
                "mdpi.com",
            ],
            SourceCategory::Gubernamentales => &[
                "gob.cl",
                "minagri.gob.cl",
                "odepa.gob.cl",
                "indap.gob.cl",
                "sag.gob.cl",
                "inia.gob.cl",
                "fao.org",
                "agricultura.gob.es",
                "gob.mx",
            ],
            SourceCategory::Noticias => &[
                "elmercurio.com",
                "latercera.com",
                "campoagroalimentario.cl",
                "redagricola.com",
                "portalfruticola.com",
                "mundoagro.cl",
                "agronomia.net",
                "infoagro.com",
                "agrodigital.com",
            ],
        }
    }
}

/// Which source tiers a search should cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Every category ("Todas las anteriores" on the form)
    All,
    Categories(Vec<SourceCategory>),
}

impl SourceSelection {
    /// Union of the selected categories' domains, first occurrence wins.
    pub fn domains(&self) -> Vec<&'static str> {
        let categories: &[SourceCategory] = match self {
            SourceSelection::All => &SourceCategory::ALL,
            SourceSelection::Categories(cats) => cats,
        };

        let mut seen = std::collections::HashSet::new();
        let mut domains = Vec::new();
        for category in categories {
            for domain in category.domains() {
                if seen.insert(*domain) {
                    domains.push(*domain);
                }
            }
        }
        domains
    }
}

/// Agricultural trends with canned search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Cultivos,
    Plagas,
    Enfermedades,
    Clima,
}

impl Trend {
    /// OR-query fed to the search endpoint for this trend
    pub fn query(&self) -> &'static str {
        match self {
            Trend::Cultivos => "cultivo OR cosecha OR producción OR rendimiento",
            Trend::Plagas => "plaga OR insecto OR control OR fumigación",
            Trend::Enfermedades => "enfermedad OR patógeno OR hongo OR bacteria OR virus",
            Trend::Clima => "clima OR sequía OR lluvia OR temperatura OR helada",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for category in SourceCategory::ALL {
            assert_eq!(SourceCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(SourceCategory::from_label("Deportivas"), None);
    }

    #[test]
    fn test_selection_all_dedups_shared_domains() {
        let domains = SourceSelection::All.domains();

        // scielo.org and fao.org appear in two categories each
        assert_eq!(
            domains.iter().filter(|d| **d == "scielo.org").count(),
            1
        );
        assert_eq!(domains.iter().filter(|d| **d == "fao.org").count(), 1);

        let total: usize = SourceCategory::ALL.iter().map(|c| c.domains().len()).sum();
        assert!(domains.len() < total);
    }

    #[test]
    fn test_selection_single_category() {
        let domains =
            SourceSelection::Categories(vec![SourceCategory::Gubernamentales]).domains();

        assert!(domains.contains(&"minagri.gob.cl"));
        assert!(!domains.contains(&"elmercurio.com"));
    }

    #[test]
    fn test_trend_queries() {
        assert!(Trend::Clima.query().contains("sequía"));
        assert!(Trend::Plagas.query().contains("plaga"));
    }
}
