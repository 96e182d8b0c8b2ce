use crate::auth::extractor::AuthAccount;
use crate::models::Account;

/// Whether `actor` may modify `target`: accounts edit themselves, superusers edit anyone.
pub fn can_edit(actor: &AuthAccount, target: &Account) -> bool {
    actor.is_superuser || actor.account_id == target.id
}
