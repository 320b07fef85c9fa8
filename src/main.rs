/*
 * Responsibility
 * - tokio runtime 起動
 * - app::run() の呼び出し（ロジックは置かない）
 */
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    todo_gate::app::run().await
}
