use async_trait::async_trait;

use crate::domain::entity::{Drink, NewDrink};

/// DrinkRepository はドリンクの永続化を抽象化する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// 全ドリンクを id 昇順で返す。
    async fn find_all(&self) -> anyhow::Result<Vec<Drink>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Drink>>;
    /// 指定タイトルのドリンクが存在するか。`exclude_id` のドリンクは判定から除く。
    async fn exists_by_title(&self, title: &str, exclude_id: Option<i32>) -> anyhow::Result<bool>;
    async fn create(&self, drink: &NewDrink) -> anyhow::Result<Drink>;
    /// 更新対象が存在しなかった場合は `Ok(false)`。
    async fn update(&self, drink: &Drink) -> anyhow::Result<bool>;
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
    /// 全ドリンクを破棄し、サンプルドリンクだけの状態に戻す。
    async fn reset(&self) -> anyhow::Result<()>;
}
