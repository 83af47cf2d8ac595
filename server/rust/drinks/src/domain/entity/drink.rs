use serde::{Deserialize, Deserializer, Serialize};

/// タイトルの最大文字数（drinks.title VARCHAR(80) と一致させる）
pub const MAX_TITLE_LEN: usize = 80;

/// Ingredient はレシピを構成する材料の 1 つを表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

/// Recipe は材料のリスト。
///
/// 入力では単一の材料オブジェクトも受け付け、1 要素の配列として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match OneOrMany::deserialize(deserializer) {
            Ok(OneOrMany::One(ingredient)) => Ok(Recipe(vec![ingredient])),
            Ok(OneOrMany::Many(ingredients)) => Ok(Recipe(ingredients)),
            Err(_) => Err(serde::de::Error::custom(
                "recipe must be an ingredient object or an array of ingredients",
            )),
        }
    }
}

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// 材料の内容を検証する。空のレシピ、名前が空の材料、parts が 0 の材料は不正。
    pub fn validate(&self) -> Result<(), DrinkValidationError> {
        if self.0.is_empty() {
            return Err(DrinkValidationError::EmptyRecipe);
        }
        for (i, ingredient) in self.0.iter().enumerate() {
            if ingredient.name.trim().is_empty() {
                return Err(DrinkValidationError::InvalidIngredient(i, "name is empty"));
            }
            if ingredient.parts == 0 {
                return Err(DrinkValidationError::InvalidIngredient(
                    i,
                    "parts must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// DrinkValidationError はドリンク入力の検証エラーを表す。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrinkValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title must be at most 80 characters")]
    TitleTooLong,

    #[error("recipe must contain at least one ingredient")]
    EmptyRecipe,

    #[error("ingredient {0}: {1}")]
    InvalidIngredient(usize, &'static str),
}

/// タイトルの前後の空白を取り除く。検証、重複判定、保存はこの値で行う。
pub fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}

/// タイトルを検証する。前後の空白だけのタイトルは空とみなす。
pub fn validate_title(title: &str) -> Result<(), DrinkValidationError> {
    if title.trim().is_empty() {
        return Err(DrinkValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DrinkValidationError::TitleTooLong);
    }
    Ok(())
}

/// Drink はメニュー上のドリンクを表す。id はストレージが採番する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// 材料名を含まない公開用の材料表現。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// ShortDrink は認証なしで返すドリンクの表現。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// LongDrink は材料名を含む詳細表現。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}

/// NewDrink は採番前のドリンク。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    pub fn validate(&self) -> Result<(), DrinkValidationError> {
        validate_title(&self.title)?;
        self.recipe.validate()
    }

    /// 初期化時に投入するサンプルドリンク。
    pub fn sample() -> Self {
        Self {
            title: "water".to_string(),
            recipe: Recipe::new(vec![Ingredient {
                color: "blue".to_string(),
                name: "water".to_string(),
                parts: 1,
            }]),
        }
    }
}
