//! Friendship Graph - the symmetric "is friend of" relation between users.
//!
//! ## Invariant
//! `b ∈ friends_of(a)` if and only if `a ∈ friends_of(b)`.
//!
//! Both directions of an edge are written under the same write guard, so
//! no reader or concurrent writer can observe one direction without the
//! other.

use catalog::{CatalogError, Entity, EntityStore, Result, UserId};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Symmetric friendship relation over registered user ids
pub struct FriendshipGraph {
    /// Used to check that both ends of an edge are registered users
    store: Arc<dyn EntityStore>,

    /// Adjacency sets, kept symmetric
    adjacency: RwLock<HashMap<UserId, HashSet<UserId>>>,
}

impl FriendshipGraph {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            adjacency: RwLock::new(HashMap::new()),
        }
    }

    fn ensure_registered(&self, user_id: UserId) -> Result<()> {
        if self.store.user_exists(user_id) {
            Ok(())
        } else {
            Err(CatalogError::not_found(Entity::User, user_id))
        }
    }

    /// Make two users friends. Re-adding an existing friendship is a no-op.
    #[instrument(skip(self))]
    pub fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<()> {
        self.ensure_registered(user_id)?;
        self.ensure_registered(friend_id)?;

        let mut adjacency = self.adjacency.write();
        let added = adjacency.entry(user_id).or_default().insert(friend_id);
        adjacency.entry(friend_id).or_default().insert(user_id);

        if added {
            info!("Users {} and {} are now friends", user_id, friend_id);
        } else {
            debug!("Users {} and {} were already friends", user_id, friend_id);
        }
        Ok(())
    }

    /// End a friendship. Removing an edge that does not exist is a no-op.
    #[instrument(skip(self))]
    pub fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<()> {
        self.ensure_registered(user_id)?;
        self.ensure_registered(friend_id)?;

        let mut adjacency = self.adjacency.write();
        let removed = detach(&mut adjacency, user_id, friend_id);
        detach(&mut adjacency, friend_id, user_id);

        if removed {
            info!("Users {} and {} are no longer friends", user_id, friend_id);
        }
        Ok(())
    }

    /// Friend ids of a registered user
    pub fn friends_of(&self, user_id: UserId) -> Result<BTreeSet<UserId>> {
        self.ensure_registered(user_id)?;
        Ok(self
            .adjacency
            .read()
            .get(&user_id)
            .map(|friends| friends.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Ids that are friends of both users (`friends_of(a) ∩ friends_of(b)`)
    #[instrument(skip(self))]
    pub fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<BTreeSet<UserId>> {
        self.ensure_registered(user_id)?;
        self.ensure_registered(other_id)?;

        let adjacency = self.adjacency.read();
        let common: BTreeSet<UserId> = match (adjacency.get(&user_id), adjacency.get(&other_id)) {
            (Some(first), Some(second)) => first.intersection(second).copied().collect(),
            _ => BTreeSet::new(),
        };

        debug!("Users {} and {} share {} friends", user_id, other_id, common.len());
        Ok(common)
    }

    pub fn are_friends(&self, user_id: UserId, friend_id: UserId) -> bool {
        self.adjacency
            .read()
            .get(&user_id)
            .is_some_and(|friends| friends.contains(&friend_id))
    }

    /// Drop every edge touching a user. Returns how many friendships ended.
    pub fn forget_user(&self, user_id: UserId) -> usize {
        let mut adjacency = self.adjacency.write();
        let Some(friends) = adjacency.remove(&user_id) else {
            return 0;
        };
        for &friend_id in &friends {
            detach(&mut adjacency, friend_id, user_id);
        }
        friends.len()
    }

    /// Number of (undirected) friendships, a self-edge counting once
    pub fn friendship_count(&self) -> usize {
        self.adjacency
            .read()
            .iter()
            .map(|(user_id, friends)| friends.iter().filter(|&&f| f >= *user_id).count())
            .sum()
    }
}

/// Remove `to` from the adjacency set of `from`, dropping the set when it empties
fn detach(adjacency: &mut HashMap<UserId, HashSet<UserId>>, from: UserId, to: UserId) -> bool {
    let Some(friends) = adjacency.get_mut(&from) else {
        return false;
    };
    let removed = friends.remove(&to);
    if friends.is_empty() {
        adjacency.remove(&from);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, ErrorKind, NewUser};
    use chrono::NaiveDate;

    fn create_test_graph(user_count: u32) -> FriendshipGraph {
        let index = CatalogIndex::new();
        for i in 1..=user_count {
            index.create_user(NewUser {
                email: format!("user{}@example.com", i),
                login: format!("Login{}", i),
                name: None,
                birthday: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            })
            .unwrap();
        }
        FriendshipGraph::new(Arc::new(index))
    }

    #[test]
    fn test_add_friend_is_symmetric() {
        let graph = create_test_graph(2);
        graph.add_friend(1, 2).unwrap();

        assert_eq!(graph.friends_of(1).unwrap(), BTreeSet::from([2]));
        assert_eq!(graph.friends_of(2).unwrap(), BTreeSet::from([1]));
        assert!(graph.are_friends(2, 1));
    }

    #[test]
    fn test_add_friend_is_idempotent() {
        let graph = create_test_graph(2);
        graph.add_friend(1, 2).unwrap();
        graph.add_friend(1, 2).unwrap();
        graph.add_friend(2, 1).unwrap();

        assert_eq!(graph.friends_of(1).unwrap().len(), 1);
        assert_eq!(graph.friendship_count(), 1);
    }

    #[test]
    fn test_unregistered_users_are_not_found() {
        let graph = create_test_graph(1);

        let err = graph.add_friend(1, 99).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(graph.friends_of(99).is_err());
        assert!(graph.common_friends(99, 1).is_err());
        // The failed add must not leave a half edge behind
        assert!(graph.friends_of(1).unwrap().is_empty());
    }

    #[test]
    fn test_self_friendship_is_an_ordinary_edge() {
        let graph = create_test_graph(2);
        graph.add_friend(1, 1).unwrap();
        graph.add_friend(1, 1).unwrap();
        graph.add_friend(1, 2).unwrap();

        assert_eq!(graph.friends_of(1).unwrap(), BTreeSet::from([1, 2]));
        assert_eq!(graph.friendship_count(), 2);

        graph.remove_friend(1, 1).unwrap();
        assert_eq!(graph.friends_of(1).unwrap(), BTreeSet::from([2]));
        assert_eq!(graph.forget_user(1), 1);
        assert_eq!(graph.friendship_count(), 0);
    }

    #[test]
    fn test_remove_friend_both_directions() {
        let graph = create_test_graph(3);
        graph.add_friend(1, 2).unwrap();
        graph.add_friend(1, 3).unwrap();

        graph.remove_friend(2, 1).unwrap();

        assert_eq!(graph.friends_of(1).unwrap(), BTreeSet::from([3]));
        assert!(graph.friends_of(2).unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_edge_is_noop() {
        let graph = create_test_graph(2);
        graph.remove_friend(1, 2).unwrap();
        assert_eq!(graph.friendship_count(), 0);
    }

    #[test]
    fn test_common_friends() {
        let graph = create_test_graph(5);
        graph.add_friend(1, 3).unwrap();
        graph.add_friend(1, 4).unwrap();
        graph.add_friend(2, 3).unwrap();
        graph.add_friend(2, 4).unwrap();
        graph.add_friend(2, 5).unwrap();

        assert_eq!(graph.common_friends(1, 2).unwrap(), BTreeSet::from([3, 4]));
        // No shared friends is an empty result, not an error
        assert!(graph.common_friends(3, 5).unwrap().is_empty());
    }

    #[test]
    fn test_forget_user_removes_every_edge() {
        let graph = create_test_graph(3);
        graph.add_friend(1, 2).unwrap();
        graph.add_friend(1, 3).unwrap();
        graph.add_friend(2, 3).unwrap();

        assert_eq!(graph.forget_user(1), 2);
        assert!(!graph.are_friends(2, 1));
        assert!(!graph.are_friends(3, 1));
        assert!(graph.are_friends(2, 3));
        assert_eq!(graph.friendship_count(), 1);
    }
}
