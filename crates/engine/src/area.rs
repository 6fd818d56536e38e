use tracing::debug;

use crate::entity::{
    Container, ContainerTemplate, Creature, CreatureTemplateId, EntityId,
};
use crate::hex::HexPoint;

/// One loaded world area: creatures and containers standing on hex tiles.
/// All mutation happens on the single simulation thread; ids are stable for
/// the lifetime of the area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    name: String,
    next_entity_id: u64,
    creatures: Vec<Creature>,
    containers: Vec<Container>,
    /// Template used for the temporary piles created when items are dropped
    /// on a bare tile.
    ground_pile_template: ContainerTemplate,
}

impl Area {
    pub fn new(name: impl Into<String>, ground_pile_template: ContainerTemplate) -> Self {
        Self {
            name: name.into(),
            next_entity_id: 0,
            creatures: Vec::new(),
            containers: Vec::new(),
            ground_pile_template,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn alloc_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    pub fn spawn_creature(
        &mut self,
        template: CreatureTemplateId,
        label: impl Into<String>,
        location: HexPoint,
        round_action_points: i32,
    ) -> EntityId {
        let id = self.alloc_entity_id();
        self.creatures
            .push(Creature::new(id, template, label, location, round_action_points));
        id
    }

    pub fn spawn_container(
        &mut self,
        template: &ContainerTemplate,
        location: HexPoint,
    ) -> EntityId {
        let id = self.alloc_entity_id();
        self.containers.push(Container::new(id, template, location));
        id
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creatures_mut(&mut self) -> impl Iterator<Item = &mut Creature> {
        self.creatures.iter_mut()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.iter().find(|creature| creature.id == id)
    }

    pub fn creature_mut(&mut self, id: EntityId) -> Option<&mut Creature> {
        self.creatures.iter_mut().find(|creature| creature.id == id)
    }

    pub fn container(&self, id: EntityId) -> Option<&Container> {
        self.containers.iter().find(|container| container.id == id)
    }

    pub fn container_mut(&mut self, id: EntityId) -> Option<&mut Container> {
        self.containers
            .iter_mut()
            .find(|container| container.id == id)
    }

    pub fn remove_container(&mut self, id: EntityId) -> Option<Container> {
        let index = self
            .containers
            .iter()
            .position(|container| container.id == id)?;
        Some(self.containers.remove(index))
    }

    pub fn container_at(&self, location: HexPoint) -> Option<EntityId> {
        self.containers
            .iter()
            .find(|container| container.location == location)
            .map(|container| container.id)
    }

    /// Finds the container on `location`, creating a temporary ground pile
    /// when the tile has none. Dropped items always land in a container.
    pub fn ground_container_at(&mut self, location: HexPoint) -> EntityId {
        if let Some(id) = self.container_at(location) {
            return id;
        }
        let template = self.ground_pile_template.clone();
        let id = self.spawn_container(&template, location);
        debug!(area = self.name.as_str(), ?location, "ground_pile_created");
        id
    }

    /// Removes the container when it is both empty and temporary. Called
    /// after every transfer out of a container.
    pub fn remove_container_if_spent(&mut self, id: EntityId) -> bool {
        let Some(container) = self.container(id) else {
            return false;
        };
        if !container.is_empty() || !container.temporary {
            return false;
        }
        self.remove_container(id);
        debug!(area = self.name.as_str(), entity = id.0, "temporary_container_removed");
        true
    }

    /// Mutable access to two distinct creatures at once (give actions).
    pub fn creature_pair_mut(
        &mut self,
        first: EntityId,
        second: EntityId,
    ) -> Option<(&mut Creature, &mut Creature)> {
        let first_index = self
            .creatures
            .iter()
            .position(|creature| creature.id == first)?;
        let second_index = self
            .creatures
            .iter()
            .position(|creature| creature.id == second)?;
        if first_index == second_index {
            return None;
        }
        if first_index < second_index {
            let (head, tail) = self.creatures.split_at_mut(second_index);
            Some((&mut head[first_index], &mut tail[0]))
        } else {
            let (head, tail) = self.creatures.split_at_mut(first_index);
            Some((&mut tail[0], &mut head[second_index]))
        }
    }

    /// Mutable access to a creature and a container at once (take/drop).
    pub fn creature_and_container_mut(
        &mut self,
        creature_id: EntityId,
        container_id: EntityId,
    ) -> Option<(&mut Creature, &mut Container)> {
        let creature_index = self
            .creatures
            .iter()
            .position(|creature| creature.id == creature_id)?;
        let container_index = self
            .containers
            .iter()
            .position(|container| container.id == container_id)?;
        Some((
            &mut self.creatures[creature_index],
            &mut self.containers[container_index],
        ))
    }
}
