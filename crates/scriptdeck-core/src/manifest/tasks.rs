use serde::Serialize;

/// A named command line declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: String,
    /// Literal command text, never parsed
    pub command: String,
}

/// Tasks of one package, in declaration order, names unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a task; a replaced task keeps its position
    pub fn insert(&mut self, name: impl Into<String>, command: impl Into<String>) {
        let name = name.into();
        let command = command.into();
        match self.tasks.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.command = command,
            None => self.tasks.push(Task { name, command }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tasks
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.command.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for TaskSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut set = TaskSet::new();
        for (name, command) in iter {
            set.insert(name, command);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_declaration_order() {
        let tasks: TaskSet = [("test", "jest"), ("build", "tsc"), ("lint", "eslint .")]
            .into_iter()
            .collect();
        let names: Vec<&str> = tasks.names().collect();
        assert_eq!(names, vec!["test", "build", "lint"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut tasks = TaskSet::new();
        tasks.insert("build", "tsc");
        tasks.insert("test", "jest");
        tasks.insert("build", "tsc -b");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.get("build"), Some("tsc -b"));
        assert_eq!(tasks.names().next(), Some("build"));
        assert!(!tasks.contains("lint"));
    }
}
