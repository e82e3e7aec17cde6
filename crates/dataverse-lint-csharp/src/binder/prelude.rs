//! Framework stubs bound alongside user code.
//!
//! Only signatures matter here: the binder reads names, bases, member
//! types and parameter lists. User declarations always win a simple-name
//! lookup because they are collected first.

pub(super) const SOURCE: &str = r"using System;
using System.Collections.Generic;
using Microsoft.Xrm.Sdk.Query;

namespace System
{
    public class Object
    {
        public virtual string ToString();
        public virtual bool Equals(object obj);
        public virtual int GetHashCode();
        public Type GetType();
    }

    public class String
    {
        public static readonly string Empty;
        public int Length { get; }
        public char this[int index] { get; }
        public bool Contains(string value);
        public bool StartsWith(string value);
        public bool EndsWith(string value);
        public bool Equals(string value, StringComparison comparisonType);
        public string ToLower();
        public string ToLowerInvariant();
        public string ToUpper();
        public string Trim();
        public string Substring(int startIndex, int length = 0);
        public string Replace(string oldValue, string newValue);
        public string[] Split(params char[] separator);
        public static bool IsNullOrEmpty(string value);
        public static bool IsNullOrWhiteSpace(string value);
        public static string Format(string format, params object[] args);
        public static string Join(string separator, params object[] values);
    }

    public enum StringComparison { CurrentCulture, CurrentCultureIgnoreCase, InvariantCulture, InvariantCultureIgnoreCase, Ordinal, OrdinalIgnoreCase }

    public struct Boolean { public static bool Parse(string value); }
    public struct Int32 { public static int Parse(string s); public static bool TryParse(string s, out int result); }
    public struct Int64 { public static long Parse(string s); }
    public struct Decimal { public static decimal Parse(string s); }
    public struct Double { public static double Parse(string s); }

    public struct Nullable<T> where T : struct
    {
        public bool HasValue { get; }
        public T Value { get; }
        public T GetValueOrDefault();
    }

    public abstract class Array { public int Length { get; } }
    public class Type { public string Name { get; } public string FullName { get; } }

    public class Exception
    {
        public Exception();
        public Exception(string message);
        public Exception(string message, Exception innerException);
        public string Message { get; }
        public Exception InnerException { get; }
    }

    public class ArgumentNullException : Exception { public ArgumentNullException(string paramName); }
    public class InvalidOperationException : Exception { public InvalidOperationException(string message); }

    public interface IServiceProvider { object GetService(Type serviceType); }
    public interface IDisposable { void Dispose(); }

    public struct Guid
    {
        public static readonly Guid Empty;
        public static Guid NewGuid();
        public static Guid Parse(string input);
        public override string ToString();
    }

    public struct DateTime
    {
        public static DateTime Now { get; }
        public static DateTime UtcNow { get; }
        public static DateTime Today { get; }
        public DateTime AddDays(double value);
        public DateTime ToUniversalTime();
    }
}

namespace System.Collections.Generic
{
    public interface IEnumerable<T> { }
    public interface ICollection<T> : IEnumerable<T> { int Count { get; } void Add(T item); bool Contains(T item); }
    public interface IList<T> : ICollection<T> { T this[int index] { get; set; } }
    public struct KeyValuePair<TKey, TValue> { public TKey Key { get; } public TValue Value { get; } }

    public class List<T> : IList<T>
    {
        public List();
        public List(IEnumerable<T> collection);
        public int Count { get; }
        public T this[int index] { get; set; }
        public void Add(T item);
        public void AddRange(IEnumerable<T> collection);
        public bool Contains(T item);
        public T[] ToArray();
    }

    public class Dictionary<TKey, TValue> : ICollection<KeyValuePair<TKey, TValue>>
    {
        public Dictionary();
        public int Count { get; }
        public TValue this[TKey key] { get; set; }
        public void Add(TKey key, TValue value);
        public bool ContainsKey(TKey key);
        public bool TryGetValue(TKey key, out TValue value);
        public bool Remove(TKey key);
    }
}

namespace System.Threading.Tasks
{
    public class Task
    {
        public static Task CompletedTask { get; }
        public static Task Delay(int millisecondsDelay);
        public void Wait();
    }

    public class Task<TResult> : Task { public TResult Result { get; } }
}

namespace Microsoft.Xrm.Sdk
{
    public class AttributeCollection
    {
        public int Count { get; }
        public object this[string attributeName] { get; set; }
        public bool Contains(string key);
        public bool ContainsKey(string key);
        public void Add(string key, object value);
        public bool Remove(string key);
    }

    public class Entity
    {
        public Entity();
        public Entity(string entityName);
        public Entity(string entityName, Guid id);
        public Guid Id { get; set; }
        public string LogicalName { get; set; }
        public AttributeCollection Attributes { get; set; }
        public object this[string attributeName] { get; set; }
        public bool Contains(string attributeName);
        public T GetAttributeValue<T>(string attributeLogicalName);
        public T ToEntity<T>() where T : Entity;
        public EntityReference ToEntityReference();
    }

    public class EntityReference
    {
        public EntityReference();
        public EntityReference(string logicalName, Guid id);
        public Guid Id { get; set; }
        public string LogicalName { get; set; }
        public string Name { get; set; }
    }

    public class OptionSetValue { public OptionSetValue(); public OptionSetValue(int value); public int Value { get; set; } }
    public class Money { public Money(); public Money(decimal value); public decimal Value { get; set; } }
    public class EntityCollection { public List<Entity> Entities { get; } public string EntityName { get; set; } }

    public class ParameterCollection
    {
        public int Count { get; }
        public object this[string key] { get; set; }
        public bool Contains(string key);
        public bool ContainsKey(string key);
        public bool TryGetValue<T>(string key, out T value);
    }

    public class EntityImageCollection
    {
        public Entity this[string key] { get; set; }
        public bool Contains(string key);
        public bool ContainsKey(string key);
    }

    public interface IPlugin { void Execute(IServiceProvider serviceProvider); }

    public interface IExecutionContext
    {
        string MessageName { get; }
        string PrimaryEntityName { get; }
        Guid PrimaryEntityId { get; }
        Guid UserId { get; }
        Guid InitiatingUserId { get; }
        int Depth { get; }
        int Mode { get; }
        ParameterCollection InputParameters { get; }
        ParameterCollection OutputParameters { get; }
        ParameterCollection SharedVariables { get; }
        EntityImageCollection PreEntityImages { get; }
        EntityImageCollection PostEntityImages { get; }
    }

    public interface IPluginExecutionContext : IExecutionContext
    {
        int Stage { get; }
        IPluginExecutionContext ParentContext { get; }
    }

    public class OrganizationRequest { public string RequestName { get; set; } public ParameterCollection Parameters { get; set; } }
    public class OrganizationResponse { public ParameterCollection Results { get; set; } }

    public interface IOrganizationService
    {
        Guid Create(Entity entity);
        void Update(Entity entity);
        void Delete(string entityName, Guid id);
        Entity Retrieve(string entityName, Guid id, ColumnSet columnSet);
        EntityCollection RetrieveMultiple(QueryBase query);
        OrganizationResponse Execute(OrganizationRequest request);
    }

    public interface IOrganizationServiceFactory { IOrganizationService CreateOrganizationService(Guid? userId); }
    public interface ITracingService { void Trace(string format, params object[] args); }

    public class InvalidPluginExecutionException : Exception
    {
        public InvalidPluginExecutionException(string message);
        public InvalidPluginExecutionException(string message, Exception inner);
    }
}

namespace Microsoft.Xrm.Sdk.Query
{
    public enum ConditionOperator { Equal, NotEqual, GreaterThan, LessThan, Null, NotNull, In, Like }

    public class ColumnSet
    {
        public ColumnSet();
        public ColumnSet(bool allColumns);
        public ColumnSet(params string[] columns);
        public void AddColumns(params string[] columns);
    }

    public abstract class QueryBase { }

    public class FilterExpression
    {
        public void AddCondition(string attributeName, ConditionOperator conditionOperator, params object[] values);
    }

    public class QueryExpression : QueryBase
    {
        public QueryExpression();
        public QueryExpression(string entityName);
        public string EntityName { get; set; }
        public ColumnSet ColumnSet { get; set; }
        public FilterExpression Criteria { get; set; }
    }
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use std::path::Path;

    #[test]
    fn test_prelude_parses_cleanly() {
        let tree = parser::parse(Path::new("prelude.cs"), SOURCE);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
    }
}
