//! Japanese-locale personal info records built from fixed pools.

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BuddyError;

pub const MAX_PERSONAL_COUNT: usize = 1000;

// (kanji, katakana, romaji)
const LAST_NAMES: &[(&str, &str, &str)] = &[
    ("佐藤", "サトウ", "sato"),
    ("鈴木", "スズキ", "suzuki"),
    ("高橋", "タカハシ", "takahashi"),
    ("田中", "タナカ", "tanaka"),
    ("伊藤", "イトウ", "ito"),
    ("渡辺", "ワタナベ", "watanabe"),
    ("山本", "ヤマモト", "yamamoto"),
    ("中村", "ナカムラ", "nakamura"),
    ("小林", "コバヤシ", "kobayashi"),
    ("加藤", "カトウ", "kato"),
    ("吉田", "ヨシダ", "yoshida"),
    ("山田", "ヤマダ", "yamada"),
];

const MALE_FIRST_NAMES: &[(&str, &str, &str)] = &[
    ("太郎", "タロウ", "taro"),
    ("翔太", "ショウタ", "shota"),
    ("大輔", "ダイスケ", "daisuke"),
    ("健太", "ケンタ", "kenta"),
    ("蓮", "レン", "ren"),
    ("悠真", "ユウマ", "yuma"),
    ("拓也", "タクヤ", "takuya"),
    ("直樹", "ナオキ", "naoki"),
];

const FEMALE_FIRST_NAMES: &[(&str, &str, &str)] = &[
    ("花子", "ハナコ", "hanako"),
    ("陽菜", "ヒナ", "hina"),
    ("美咲", "ミサキ", "misaki"),
    ("結衣", "ユイ", "yui"),
    ("さくら", "サクラ", "sakura"),
    ("葵", "アオイ", "aoi"),
    ("由美", "ユミ", "yumi"),
    ("彩", "アヤ", "aya"),
];

// (prefecture, cities)
const PREFECTURES: &[(&str, &[&str])] = &[
    ("東京都", &["千代田区", "新宿区", "渋谷区", "世田谷区"]),
    ("大阪府", &["大阪市北区", "堺市", "豊中市"]),
    ("神奈川県", &["横浜市", "川崎市", "相模原市"]),
    ("愛知県", &["名古屋市", "豊田市", "岡崎市"]),
    ("福岡県", &["福岡市", "北九州市", "久留米市"]),
    ("北海道", &["札幌市", "函館市", "旭川市"]),
];

const TOWNS: &[&str] = &["本町", "中央", "栄町", "緑町", "旭町", "桜木町"];

const COMPANIES: &[&str] = &[
    "株式会社テストデータ",
    "サンプル商事株式会社",
    "株式会社ダミーシステムズ",
    "合同会社モックワークス",
    "株式会社品質保証研究所",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.jp", "test.example.org"];

const MOBILE_PREFIXES: &[&str] = &["070", "080", "090"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    FullName,
    FullNameKana,
    Email,
    Phone,
    PostalCode,
    Address,
    BirthDate,
    Age,
    Gender,
    Company,
}

impl PersonalField {
    pub const ALL: [PersonalField; 10] = [
        PersonalField::FullName,
        PersonalField::FullNameKana,
        PersonalField::Email,
        PersonalField::Phone,
        PersonalField::PostalCode,
        PersonalField::Address,
        PersonalField::BirthDate,
        PersonalField::Age,
        PersonalField::Gender,
        PersonalField::Company,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PersonalField::FullName => "fullName",
            PersonalField::FullNameKana => "fullNameKana",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::PostalCode => "postalCode",
            PersonalField::Address => "address",
            PersonalField::BirthDate => "birthDate",
            PersonalField::Age => "age",
            PersonalField::Gender => "gender",
            PersonalField::Company => "company",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfoOptions {
    pub count: usize,
    pub age_min: u32,
    pub age_max: u32,
    /// Empty selects every field.
    pub fields: Vec<PersonalField>,
}

impl Default for PersonalInfoOptions {
    fn default() -> Self {
        Self {
            count: 10,
            age_min: 20,
            age_max: 65,
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub full_name_kana: String,
    pub email: String,
    pub phone: String,
    pub postal_code: String,
    pub address: String,
    pub birth_date: NaiveDate,
    pub age: u32,
    pub gender: Gender,
    pub company: String,
}

impl PersonalInfo {
    /// Flat record restricted to `fields`, keyed in field order.
    pub fn project(&self, fields: &[PersonalField]) -> Map<String, Value> {
        let fields = if fields.is_empty() {
            &PersonalField::ALL[..]
        } else {
            fields
        };
        let mut out = Map::new();
        for field in fields {
            let value = match field {
                PersonalField::FullName => Value::from(self.full_name.clone()),
                PersonalField::FullNameKana => Value::from(self.full_name_kana.clone()),
                PersonalField::Email => Value::from(self.email.clone()),
                PersonalField::Phone => Value::from(self.phone.clone()),
                PersonalField::PostalCode => Value::from(self.postal_code.clone()),
                PersonalField::Address => Value::from(self.address.clone()),
                PersonalField::BirthDate => Value::from(self.birth_date.to_string()),
                PersonalField::Age => Value::from(self.age),
                PersonalField::Gender => Value::from(self.gender.label()),
                PersonalField::Company => Value::from(self.company.clone()),
            };
            out.insert(field.key().to_string(), value);
        }
        out
    }
}

/// Whole years elapsed between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

pub fn generate_personal_info<R: Rng>(
    rng: &mut R,
    options: &PersonalInfoOptions,
    today: NaiveDate,
) -> Result<Vec<PersonalInfo>, BuddyError> {
    if options.count == 0 || options.count > MAX_PERSONAL_COUNT {
        return Err(BuddyError::InvalidInput(format!(
            "count must be between 1 and {MAX_PERSONAL_COUNT}"
        )));
    }
    if options.age_min > options.age_max || options.age_max > 120 {
        return Err(BuddyError::InvalidInput(
            "age range must satisfy 0 <= ageMin <= ageMax <= 120".to_string(),
        ));
    }

    (0..options.count)
        .map(|_| generate_one(rng, options, today))
        .collect()
}

fn generate_one<R: Rng>(
    rng: &mut R,
    options: &PersonalInfoOptions,
    today: NaiveDate,
) -> Result<PersonalInfo, BuddyError> {
    let gender = if rng.random_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let first_pool = match gender {
        Gender::Male => MALE_FIRST_NAMES,
        Gender::Female => FEMALE_FIRST_NAMES,
    };
    let &(last, last_kana, last_romaji) = pick(rng, LAST_NAMES)?;
    let &(first, first_kana, first_romaji) = pick(rng, first_pool)?;

    let email = format!(
        "{first_romaji}.{last_romaji}{}@{}",
        rng.random_range(1..1000),
        pick(rng, EMAIL_DOMAINS)?
    );
    let phone = format!(
        "{}-{:04}-{:04}",
        pick(rng, MOBILE_PREFIXES)?,
        rng.random_range(0..10_000),
        rng.random_range(0..10_000)
    );
    let postal_code = format!(
        "{:03}-{:04}",
        rng.random_range(100..1000),
        rng.random_range(0..10_000)
    );
    let &(prefecture, cities) = pick(rng, PREFECTURES)?;
    let address = format!(
        "{prefecture}{}{}{}-{}-{}",
        pick(rng, cities)?,
        pick(rng, TOWNS)?,
        rng.random_range(1..10),
        rng.random_range(1..30),
        rng.random_range(1..20)
    );

    let birth_date = birth_date_for_age(rng, options.age_min, options.age_max, today)?;

    Ok(PersonalInfo {
        full_name: format!("{last} {first}"),
        full_name_kana: format!("{last_kana} {first_kana}"),
        email,
        phone,
        postal_code,
        address,
        birth_date,
        age: age_on(birth_date, today),
        gender,
        company: pick(rng, COMPANIES)?.to_string(),
    })
}

/// Birth date whose age on `today` falls inside `age_min..=age_max`.
fn birth_date_for_age<R: Rng>(
    rng: &mut R,
    age_min: u32,
    age_max: u32,
    today: NaiveDate,
) -> Result<NaiveDate, BuddyError> {
    let age = rng.random_range(age_min..=age_max);
    let out_of_range = || BuddyError::InvalidInput("birth date out of calendar range".to_string());
    // Latest birth date with this age, and the day after the latest with age + 1.
    let latest = today
        .checked_sub_months(Months::new(12 * age))
        .ok_or_else(out_of_range)?;
    let earliest = today
        .checked_sub_months(Months::new(12 * (age + 1)))
        .and_then(|d| d.succ_opt())
        .ok_or_else(out_of_range)?;
    let span = (latest - earliest).num_days().max(0);
    let offset = rng.random_range(0..=span);
    Ok(latest - chrono::Duration::days(offset))
}

fn pick<'a, R: Rng, T>(rng: &mut R, pool: &'a [T]) -> Result<&'a T, BuddyError> {
    pool.choose(rng)
        .ok_or_else(|| BuddyError::Generation("empty data pool".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    #[test]
    fn ages_match_birth_dates_and_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let opts = PersonalInfoOptions {
            count: 200,
            age_min: 18,
            age_max: 30,
            fields: vec![],
        };
        let people = generate_personal_info(&mut rng, &opts, today()).unwrap();
        assert_eq!(people.len(), 200);
        for p in &people {
            assert!((18..=30).contains(&p.age), "age {}", p.age);
            assert_eq!(age_on(p.birth_date, today()), p.age);
        }
    }

    #[test]
    fn record_shapes() {
        let mut rng = StdRng::seed_from_u64(5);
        let people = generate_personal_info(&mut rng, &PersonalInfoOptions::default(), today())
            .unwrap();
        for p in people {
            assert!(p.email.contains('@'));
            assert_eq!(p.phone.len(), 13);
            assert!(p.phone.starts_with('0'));
            assert_eq!(p.postal_code.len(), 8);
            assert_eq!(p.postal_code.as_bytes()[3], b'-');
            assert!(p.full_name.contains(' '));
            assert!(p.full_name_kana.chars().all(|c| c == ' ' || ('\u{30A0}'..='\u{30FF}').contains(&c)));
        }
    }

    #[test]
    fn projection_keeps_selected_fields_in_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let opts = PersonalInfoOptions {
            count: 1,
            ..PersonalInfoOptions::default()
        };
        let person = &generate_personal_info(&mut rng, &opts, today()).unwrap()[0];
        let row = person.project(&[PersonalField::Email, PersonalField::Age]);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["email", "age"]);
        assert_eq!(person.project(&[]).len(), PersonalField::ALL.len());
    }

    #[test]
    fn invalid_ranges_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let opts = PersonalInfoOptions {
            age_min: 50,
            age_max: 40,
            ..PersonalInfoOptions::default()
        };
        assert!(generate_personal_info(&mut rng, &opts, today()).is_err());
    }

    #[test]
    fn age_on_handles_birthdays() {
        let birth = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()), 23);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), 24);
    }
}
