use std::collections::HashMap;

use crate::entity::{
    ContainerTemplate, ContainerTemplateId, CreatureTemplate, CreatureTemplateId, ItemTemplate,
    ItemTemplateId,
};

/// Compiled campaign templates, indexed by id and by def name.
#[derive(Debug, Default, Clone)]
pub struct TemplateDatabase {
    items: Vec<ItemTemplate>,
    item_ids_by_name: HashMap<String, ItemTemplateId>,
    creatures: Vec<CreatureTemplate>,
    creature_ids_by_name: HashMap<String, CreatureTemplateId>,
    containers: Vec<ContainerTemplate>,
    container_ids_by_name: HashMap<String, ContainerTemplateId>,
}

impl TemplateDatabase {
    pub(crate) fn from_templates(
        mut items: Vec<ItemTemplate>,
        mut creatures: Vec<CreatureTemplate>,
        mut containers: Vec<ContainerTemplate>,
    ) -> Self {
        let mut item_ids_by_name = HashMap::with_capacity(items.len());
        for (idx, template) in items.iter_mut().enumerate() {
            let id = ItemTemplateId(idx as u32);
            template.id = id;
            item_ids_by_name.insert(template.def_name.clone(), id);
        }

        let mut creature_ids_by_name = HashMap::with_capacity(creatures.len());
        for (idx, template) in creatures.iter_mut().enumerate() {
            let id = CreatureTemplateId(idx as u32);
            template.id = id;
            creature_ids_by_name.insert(template.def_name.clone(), id);
        }

        let mut container_ids_by_name = HashMap::with_capacity(containers.len());
        for (idx, template) in containers.iter_mut().enumerate() {
            let id = ContainerTemplateId(idx as u32);
            template.id = id;
            container_ids_by_name.insert(template.def_name.clone(), id);
        }

        Self {
            items,
            item_ids_by_name,
            creatures,
            creature_ids_by_name,
            containers,
            container_ids_by_name,
        }
    }

    pub fn item(&self, id: ItemTemplateId) -> Option<&ItemTemplate> {
        self.items.get(id.0 as usize)
    }

    pub fn item_id_by_name(&self, name: &str) -> Option<ItemTemplateId> {
        self.item_ids_by_name.get(name).copied()
    }

    pub fn items(&self) -> &[ItemTemplate] {
        &self.items
    }

    pub fn creature(&self, id: CreatureTemplateId) -> Option<&CreatureTemplate> {
        self.creatures.get(id.0 as usize)
    }

    pub fn creature_id_by_name(&self, name: &str) -> Option<CreatureTemplateId> {
        self.creature_ids_by_name.get(name).copied()
    }

    pub fn creatures(&self) -> &[CreatureTemplate] {
        &self.creatures
    }

    pub fn container(&self, id: ContainerTemplateId) -> Option<&ContainerTemplate> {
        self.containers.get(id.0 as usize)
    }

    pub fn container_id_by_name(&self, name: &str) -> Option<ContainerTemplateId> {
        self.container_ids_by_name.get(name).copied()
    }

    pub fn containers(&self) -> &[ContainerTemplate] {
        &self.containers
    }
}
