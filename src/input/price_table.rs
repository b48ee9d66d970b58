use std::collections::HashMap;

use rand::thread_rng;
use rand_distr::{Distribution, Uniform};

/// Last tradable round of a session. Round 0 is the base round and is never traded.
pub const MAX_ROUND: u8 = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriceError {
    UnknownCompany(String),
    MissingRound { company: String, round: u8 },
}

impl std::error::Error for PriceError {}

impl core::fmt::Display for PriceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PriceError::UnknownCompany(company) => write!(f, "no prices for {company}"),
            PriceError::MissingRound { company, round } => {
                write!(f, "no price for {company} in round {round}")
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
struct CompanyPrices {
    base: Option<i64>,
    rounds: HashMap<u8, i64>,
}

/// Maps (company, round) to a price. Immutable once built, a session holds exactly one.
///
/// A lookup for an undefined pair returns [PriceError] rather than a default. Substituting
/// 0 would silently underprice trades and corrupt valuation, so the caller has to decide
/// what a missing price means.
#[derive(Clone, Debug, Default)]
pub struct PriceTable {
    companies: Vec<String>,
    inner: HashMap<String, CompanyPrices>,
}

impl PriceTable {
    /// Round 0 resolves to the company's base price.
    pub fn price_at(&self, company: &str, round: u8) -> Result<i64, PriceError> {
        let prices = self
            .inner
            .get(company)
            .ok_or_else(|| PriceError::UnknownCompany(company.to_string()))?;
        let price = if round == 0 {
            prices.base
        } else {
            prices.rounds.get(&round).copied()
        };
        price.ok_or_else(|| PriceError::MissingRound {
            company: company.to_string(),
            round,
        })
    }

    pub fn has_company(&self, company: &str) -> bool {
        self.inner.contains_key(company)
    }

    /// Companies in load order.
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Fully-populated table with uniform random prices, used for tests and benchmarks.
    pub fn random(companies: Vec<&str>) -> Self {
        let price_dist = Uniform::new(50, 500);
        let mut rng = thread_rng();

        let mut builder = PriceTableBuilder::new();
        for company in companies {
            builder.add_base_price(company, price_dist.sample(&mut rng));
            for round in 1..=MAX_ROUND {
                builder.add_price(company, round, price_dist.sample(&mut rng));
            }
        }
        builder.build()
    }
}

pub struct PriceTableBuilder {
    companies: Vec<String>,
    inner: HashMap<String, CompanyPrices>,
}

impl PriceTableBuilder {
    pub fn new() -> Self {
        Self {
            companies: Vec::new(),
            inner: HashMap::new(),
        }
    }

    fn entry(&mut self, company: impl Into<String>) -> &mut CompanyPrices {
        let name = company.into();
        if !self.inner.contains_key(&name) {
            self.companies.push(name.clone());
            self.inner.insert(name.clone(), CompanyPrices::default());
        }
        //We will always have a value due to the above block so can unwrap safely
        self.inner.get_mut(&name).unwrap()
    }

    pub fn add_base_price(&mut self, company: impl Into<String>, price: i64) {
        self.entry(company).base = Some(price);
    }

    pub fn add_price(&mut self, company: impl Into<String>, round: u8, price: i64) {
        self.entry(company).rounds.insert(round, price);
    }

    pub fn build(self) -> PriceTable {
        PriceTable {
            companies: self.companies,
            inner: self.inner,
        }
    }
}

impl Default for PriceTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
