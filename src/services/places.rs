//! Hospital lookup
//!
//! Google Maps when a key is configured, otherwise a small built-in directory.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ServiceError, ServiceResult};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const SEARCH_RADIUS_M: &str = "5000";
const FALLBACK_KEYWORD: &str = "hospital";

/// Search keywords per specialization, as offered on the booking form
pub const SPECIALTY_KEYWORDS: &[(&str, &[&str])] = &[
    ("General Physical", &["general checkup", "physical checkup", "consult"]),
    ("Neurologist", &["neurologist", "neuro", "nerves", "brain doctor", "nerve specialist"]),
    ("Dermatologist", &["dermatologist", "derma", "skin", "skin specialist", "skin doctor"]),
    ("Cardiologist", &["cardiologist", "cardio", "heart doctor", "heart specialist"]),
    ("Orthopedist", &["orthopedist", "orthopedic", "bone doctor", "joint specialist", "orthopedics"]),
    ("Pediatrician", &["pediatrician", "child doctor", "pediatrics", "children specialist"]),
    ("Gynecologist", &["gynecologist", "gyno", "obstetrician", "obgyn", "women's doctor"]),
    ("Psychiatrist", &["psychiatrist", "mental health", "psych doctor", "mind specialist"]),
    ("Dentist", &["dentist", "dental", "teeth doctor", "oral care", "tooth specialist"]),
    ("Oncologist", &["oncologist", "cancer specialist", "cancer doctor", "oncology"]),
    ("Endocrinologist", &["endocrinologist", "hormone specialist", "gland doctor"]),
    ("Ophthalmologist", &["ophthalmologist", "eye doctor", "vision specialist", "eye care"]),
    ("Urologist", &["urologist", "urinary specialist", "kidney doctor", "urinary care"]),
    ("Gastroenterologist", &["gastroenterologist", "gastro", "stomach doctor", "digestive care"]),
    ("Pulmonologist", &["pulmonologist", "lung doctor", "respiratory specialist"]),
    ("ENT", &["ENT", "ear nose throat", "ENT specialist", "otolaryngologist"]),
    ("Rheumatologist", &["rheumatologist", "arthritis specialist", "joint care", "autoimmune specialist"]),
    ("Radiologist", &["radiologist", "imaging specialist", "radiology"]),
    ("Nephrologist", &["nephrologist", "kidney doctor", "renal specialist"]),
    ("Allergist", &["allergist", "immunologist", "allergy specialist", "immune care"]),
    ("Surgeon", &["surgeon", "surgery specialist", "operation doctor"]),
];

/// Specialization labels in form order
pub fn specializations() -> Vec<&'static str> {
    SPECIALTY_KEYWORDS.iter().map(|(label, _)| *label).collect()
}

/// Keywords for a specialization (case-insensitive), or just "hospital"
pub fn keywords_for(specialization: &str) -> &'static [&'static str] {
    let wanted = specialization.trim();
    SPECIALTY_KEYWORDS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(wanted))
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[FALLBACK_KEYWORD])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub phone: Option<String>,
}

/// Drop repeats of the same (name, address), keeping first-seen order
pub fn dedupe_hospitals(hospitals: Vec<Hospital>) -> Vec<Hospital> {
    let mut seen = HashSet::new();
    hospitals
        .into_iter()
        .filter(|h| seen.insert((h.name.clone(), h.address.clone())))
        .collect()
}

#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn find_hospitals(&self, location: &str, specialization: &str) -> ServiceResult<Vec<Hospital>>;

    /// Where results come from, reported alongside them
    fn source(&self) -> &'static str;
}

/// Google Geocoding + Places text search
pub struct GoogleMapsPlaces {
    http: reqwest::Client,
    api_key: String,
}

impl GoogleMapsPlaces {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> ServiceResult<Value> {
        let body: Value = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match body["status"].as_str() {
            Some("OK") | Some("ZERO_RESULTS") => Ok(body),
            other => Err(ServiceError::Api {
                service: "Google Maps",
                status: other.unwrap_or("missing").to_string(),
                message: body["error_message"].as_str().unwrap_or_default().to_string(),
            }),
        }
    }

    async fn geocode(&self, location: &str) -> ServiceResult<(f64, f64)> {
        let body = self.get(GEOCODE_URL, &[("address", location)]).await?;
        let point = &body["results"][0]["geometry"]["location"];
        match (point["lat"].as_f64(), point["lng"].as_f64()) {
            (Some(lat), Some(lng)) => Ok((lat, lng)),
            _ => Err(ServiceError::Parse(format!("Invalid location provided: {}", location))),
        }
    }
}

#[async_trait]
impl PlacesClient for GoogleMapsPlaces {
    async fn find_hospitals(&self, location: &str, specialization: &str) -> ServiceResult<Vec<Hospital>> {
        let (lat, lng) = self.geocode(location).await?;
        let center = format!("{},{}", lat, lng);

        let mut found = Vec::new();
        for &keyword in keywords_for(specialization) {
            debug!("Searching hospitals near {} for '{}'", center, keyword);
            let body = self
                .get(
                    TEXT_SEARCH_URL,
                    &[
                        ("query", keyword),
                        ("location", center.as_str()),
                        ("radius", SEARCH_RADIUS_M),
                        ("type", "hospital"),
                    ],
                )
                .await?;
            found.extend(parse_places(&body));
        }

        Ok(dedupe_hospitals(found))
    }

    fn source(&self) -> &'static str {
        "Google Maps API"
    }
}

/// Hospitals from a Places search response; entries without a name are skipped
pub fn parse_places(body: &Value) -> Vec<Hospital> {
    let Some(results) = body["results"].as_array() else {
        warn!("Places response has no results array");
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|place| {
            let name = place["name"].as_str()?;
            let address = place["vicinity"]
                .as_str()
                .or_else(|| place["formatted_address"].as_str())
                .unwrap_or_default();
            Some(Hospital {
                name: name.to_string(),
                address: address.to_string(),
                rating: place["rating"].as_f64(),
                phone: None,
            })
        })
        .collect()
}

struct DirectoryEntry {
    name: &'static str,
    address: &'static str,
    rating: f64,
    phone: &'static str,
    specializations: &'static [&'static str],
}

const DIRECTORY: &[DirectoryEntry] = &[
    DirectoryEntry {
        name: "City General Hospital",
        address: "123 Main St, City Center",
        rating: 4.5,
        phone: "+1-555-123-4567",
        specializations: &["General Physical", "Gynecologist", "Pediatrician", "Cardiologist"],
    },
    DirectoryEntry {
        name: "Women's Health Center",
        address: "456 Oak Ave, Westside",
        rating: 4.8,
        phone: "+1-555-987-6543",
        specializations: &["Gynecologist", "Pediatrician"],
    },
    DirectoryEntry {
        name: "Family Care Medical",
        address: "789 Pine Rd, Eastside",
        rating: 4.2,
        phone: "+1-555-456-7890",
        specializations: &["General Physical", "Pediatrician", "Dermatologist"],
    },
    DirectoryEntry {
        name: "Comprehensive Medical Center",
        address: "101 Cedar Blvd, Northside",
        rating: 4.6,
        phone: "+1-555-789-0123",
        specializations: &["Gynecologist", "Neurologist", "Cardiologist", "Orthopedist"],
    },
    DirectoryEntry {
        name: "Community Health Services",
        address: "202 Elm St, Southside",
        rating: 4.0,
        phone: "+1-555-321-6540",
        specializations: &["General Physical", "Gynecologist", "Psychiatrist"],
    },
];

/// Built-in directory used when no Maps key is configured. Location is ignored.
#[derive(Default)]
pub struct OfflineDirectory;

#[async_trait]
impl PlacesClient for OfflineDirectory {
    async fn find_hospitals(&self, _location: &str, specialization: &str) -> ServiceResult<Vec<Hospital>> {
        let wanted = specialization.trim();
        Ok(DIRECTORY
            .iter()
            .filter(|entry| {
                wanted.is_empty() || entry.specializations.iter().any(|s| s.eq_ignore_ascii_case(wanted))
            })
            .map(|entry| Hospital {
                name: entry.name.to_string(),
                address: entry.address.to_string(),
                rating: Some(entry.rating),
                phone: Some(entry.phone.to_string()),
            })
            .collect())
    }

    fn source(&self) -> &'static str {
        "Offline directory"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn hospital(name: &str, address: &str) -> Hospital {
        Hospital {
            name: name.into(),
            address: address.into(),
            rating: None,
            phone: None,
        }
    }

    #[test]
    fn test_keywords_fallback() {
        assert_eq!(keywords_for("cardiologist")[0], "cardiologist");
        assert_eq!(keywords_for("ent")[0], "ENT");
        assert_eq!(keywords_for("Astrologer"), &["hospital"]);
        assert_eq!(specializations().len(), 21);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let deduped = dedupe_hospitals(vec![
            hospital("A", "1 St"),
            hospital("B", "2 St"),
            hospital("A", "1 St"),
            hospital("A", "3 St"),
        ]);
        let names: Vec<_> = deduped.iter().map(|h| (h.name.as_str(), h.address.as_str())).collect();
        assert_eq!(names, vec![("A", "1 St"), ("B", "2 St"), ("A", "3 St")]);
    }

    #[test]
    fn test_parse_places() {
        let body = json!({
            "status": "OK",
            "results": [
                { "name": "Mercy", "vicinity": "9 Hill Rd", "rating": 4.1 },
                { "name": "St. Ann", "formatted_address": "1 Bay St" },
                { "vicinity": "nameless" }
            ]
        });
        let parsed = parse_places(&body);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].rating, Some(4.1));
        assert_eq!(parsed[1].address, "1 Bay St");
    }

    #[tokio::test]
    async fn test_offline_directory_filters_by_specialization() {
        let directory = OfflineDirectory;
        let gyn = directory.find_hospitals("anywhere", "gynecologist").await.unwrap();
        assert_eq!(gyn.len(), 4);
        assert!(gyn.iter().all(|h| h.name != "Family Care Medical"));

        let neuro = directory.find_hospitals("anywhere", "Neurologist").await.unwrap();
        assert_eq!(neuro.len(), 1);
        assert_eq!(neuro[0].name, "Comprehensive Medical Center");

        let all = directory.find_hospitals("anywhere", "").await.unwrap();
        assert_eq!(all.len(), 5);
    }
}
