use crate::dump::client::StoreClient;
use crate::dump::core::{DumpError, Entry};

/// 为有序集合成员逐个查询分数，组装成 (score, member) 序列
///
/// 成员列表先整体反转作为待处理队列，再不断从队尾取出，
/// 因此查询顺序与 ZRANGE 的升序一致；每次查询都在上一次结果记录之后才发出。
/// 结果中第 i 项的分数属于原始序列第 i 个成员。
///
/// 任一查询失败立即返回该错误，剩余成员不再查询。
pub async fn attach_scores<C>(
    client: &C,
    key: &str,
    members: Vec<String>,
) -> Result<Vec<Entry>, DumpError>
where
    C: StoreClient + ?Sized,
{
    let mut pending: Vec<&str> = members.iter().rev().map(String::as_str).collect();
    let mut scores = Vec::with_capacity(members.len());

    while let Some(member) = pending.pop() {
        let score = client.score_of(key, member).await?;
        scores.push(score);
    }

    Ok(members
        .into_iter()
        .zip(scores)
        .map(|(member, score)| Entry { score, member })
        .collect())
}
