//! テナント対応スラッグ生成
//!
//! クラブ名と都市名からURLフレンドリーなスラッグを導出する。
//! キリル文字圏のテナントにはドメイン固有の文字変換マップを適用し、
//! 末尾に生成日（DDMMYYYY）を付与する。
//! 一意性は（名前, 都市, 日付）の組に依存する。同日に同名・同都市の
//! クラブが作成された場合は衝突する（呼び出し元の責任）。

use chrono::{Local, NaiveDate};

use crate::domain::club::ClubSlug;

/// マケドニア語キリル文字→ラテン文字変換
///
/// 大文字・小文字を保存する。マップ外の文字はNone。
fn macedonian(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'ѓ' => "gj",
        'е' => "e",
        'ж' => "zh",
        'з' => "z",
        'ѕ' => "dz",
        'и' => "i",
        'ј' => "j",
        'к' => "k",
        'л' => "l",
        'љ' => "lj",
        'м' => "m",
        'н' => "n",
        'њ' => "nj",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'ќ' => "kj",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'џ' => "dj",
        'ш' => "sh",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Ѓ' => "Gj",
        'Е' => "E",
        'Ж' => "Zh",
        'З' => "Z",
        'Ѕ' => "Dz",
        'И' => "I",
        'Ј' => "J",
        'К' => "K",
        'Л' => "L",
        'Љ' => "Lj",
        'М' => "M",
        'Н' => "N",
        'Њ' => "Nj",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'Ќ' => "Kj",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Ch",
        'Џ' => "Dj",
        'Ш' => "Sh",
        _ => return None,
    };
    Some(latin)
}

/// セルビア語キリル文字→ラテン文字変換
fn serbian(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'ђ' => "đ",
        'е' => "e",
        'ж' => "ž",
        'з' => "z",
        'и' => "i",
        'ј' => "j",
        'к' => "k",
        'л' => "l",
        'љ' => "lj",
        'м' => "m",
        'н' => "n",
        'њ' => "nj",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'ћ' => "ć",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "č",
        'џ' => "dž",
        'ш' => "š",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Ђ' => "Đ",
        'Е' => "E",
        'Ж' => "Ž",
        'З' => "Z",
        'И' => "I",
        'Ј' => "J",
        'К' => "K",
        'Л' => "L",
        'Љ' => "Lj",
        'М' => "M",
        'Н' => "N",
        'Њ' => "Nj",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'Ћ' => "Ć",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Č",
        'Џ' => "Dž",
        'Ш' => "Š",
        _ => return None,
    };
    Some(latin)
}

/// ドメインに対応する文字変換マップを返す
fn language_map(domain: &str) -> Option<fn(char) -> Option<&'static str>> {
    match domain {
        "mk" => Some(macedonian),
        "rs" => Some(serbian),
        _ => None,
    }
}

/// ドメイン固有の文字変換を適用する
///
/// 変換マップを持たないドメインは入力をそのまま返す。
/// マップ外の文字は変更されない。
pub fn transliterate(text: &str, domain: &str) -> String {
    let Some(map) = language_map(domain) else {
        return text.to_string();
    };

    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match map(c) {
            Some(latin) => result.push_str(latin),
            None => result.push(c),
        }
    }
    result
}

/// テキストをURLフレンドリーなスラッグに変換する
///
/// 文字変換 → 小文字化 → トリム → 英数字・アンダースコア・空白・
/// ハイフン以外を除去 → 空白列とハイフン列を単一ハイフンに畳み込む。
pub fn to_slug(text: &str, domain: &str) -> String {
    let transliterated = transliterate(text, domain);
    let lowered = transliterated.to_lowercase();
    let trimmed = lowered.trim();

    // ASCII英数字・アンダースコア・空白・ハイフン以外を除去
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    // 空白列・ハイフン列を単一ハイフンに
    let mut slug = String::with_capacity(cleaned.len());
    let mut previous_was_hyphen = false;
    for c in cleaned.chars() {
        if c.is_whitespace() || c == '-' {
            if !previous_was_hyphen {
                slug.push('-');
                previous_was_hyphen = true;
            }
        } else {
            slug.push(c);
            previous_was_hyphen = false;
        }
    }
    slug
}

/// クラブ名・都市・ドメインからスラッグを生成する（当日日付付き）
///
/// 同一入力・同一日の2回の呼び出しは同じ結果を返す。
pub fn generate_club_slug(club_name: &str, city: &str, domain: &str) -> ClubSlug {
    club_slug_for_date(club_name, city, domain, Local::now().date_naive())
}

/// 日付を指定してクラブスラッグを生成する
///
/// 形式: `<名前スラッグ>-<都市スラッグ>-<DDMMYYYY>`
pub fn club_slug_for_date(club_name: &str, city: &str, domain: &str, date: NaiveDate) -> ClubSlug {
    let name_slug = to_slug(club_name, domain);
    let city_slug = to_slug(city, domain);
    let date_str = date.format("%d%m%Y").to_string();
    ClubSlug::new(format!("{name_slug}-{city_slug}-{date_str}"))
}
