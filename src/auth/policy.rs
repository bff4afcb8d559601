use crate::database::models::Question;
use crate::middleware::AuthUser;
use crate::types::Role;

/// Whether `actor` may edit or delete `question`: admins always, otherwise
/// only the recorded submitter. Ownerless questions have no owner branch.
pub fn can_mutate(question: &Question, actor: &AuthUser) -> bool {
    if actor.role == Role::Admin {
        return true;
    }
    matches!(question.submitted_by, Some(owner) if owner == actor.id)
}
