//! # リクエスト検証
//!
//! SendGrid v3 のフィールド必須要件を固定の優先順でチェックする。
//! 最初の違反で打ち切り、エラーは蓄積しない。
//!
//! | 順 | ルール | field |
//! |----|--------|-------|
//! | 1 | `personalizations` が 1 件以上 | `personalizations` |
//! | 2 | `from.email` が空でない | `from.email` |
//! | 3 | `subject` が空でない、または全 personalization が件名を持つ | `subject` |
//! | 4 | `content` が 1 件以上 | `content` |
//! | 5 | 同じ MIME タイプの `content` が重複しない（[`ValidationPolicy`] で有効化） | `content` |
//!
//! 添付ファイルの base64 検証は [`stage_all`](super::stage_all) が担う。

use std::collections::HashSet;

use super::SendRequest;
use crate::error::ValidationError;

/// 検証ルールの切り替え
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// 同じ MIME タイプのコンテンツブロックの重複を拒否する
    pub reject_duplicate_content: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            reject_duplicate_content: true,
        }
    }
}

/// リクエスト検証器
#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// リクエストを検証する
    ///
    /// 同じリクエストに対しては常に同じ結果を返す。
    pub fn validate(&self, request: &SendRequest) -> Result<(), ValidationError> {
        require_personalizations(request)?;
        require_from_email(request)?;
        require_subject(request)?;
        require_content(request)?;
        if self.policy.reject_duplicate_content {
            reject_duplicate_content(request)?;
        }
        Ok(())
    }
}

// --- ルール ---

fn require_personalizations(request: &SendRequest) -> Result<(), ValidationError> {
    if request.personalizations.is_empty() {
        return Err(ValidationError::personalizations_required());
    }
    Ok(())
}

fn require_from_email(request: &SendRequest) -> Result<(), ValidationError> {
    if request.from.email.is_empty() {
        return Err(ValidationError::from_email_required());
    }
    Ok(())
}

/// 全 personalization が件名を持つならリクエストの件名は省略できる
fn require_subject(request: &SendRequest) -> Result<(), ValidationError> {
    if !request.subject.is_empty() {
        return Ok(());
    }
    let every_personalization_has_subject = request
        .personalizations
        .iter()
        .all(|p| !p.subject.is_empty());
    if request.personalizations.is_empty() || !every_personalization_has_subject {
        return Err(ValidationError::subject_required());
    }
    Ok(())
}

fn require_content(request: &SendRequest) -> Result<(), ValidationError> {
    if request.content.is_empty() {
        return Err(ValidationError::content_required());
    }
    Ok(())
}

fn reject_duplicate_content(request: &SendRequest) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for block in &request.content {
        if !seen.insert(block.content_type.as_str()) {
            return Err(ValidationError::duplicate_content_type());
        }
    }
    Ok(())
}
